use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use grid_defence_core::{CellCoord, TowerKind};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "grid";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "grid:v1";
/// Delimiter used to separate the prefix, grid size and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the towers placed on the grid and the grid size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TowerLayoutSnapshot {
    /// Number of cells along each edge of the grid.
    pub(crate) size: u32,
    /// Towers composing the layout captured by the snapshot.
    pub(crate) towers: Vec<TowerLayoutTower>,
}

impl TowerLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            towers: self.towers.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}:{}:{encoded}", self.size))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let size = parts.next().ok_or(LayoutTransferError::MissingSize)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_size(size)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            size,
            towers: decoded.towers,
        })
    }
}

/// Tower description captured within a layout snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TowerLayoutTower {
    /// Type of tower represented by the snapshot.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    towers: Vec<TowerLayoutTower>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include the grid size.
    MissingSize,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid size could not be parsed from the encoded snapshot.
    InvalidSize(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingSize => write!(f, "layout string is missing the grid size"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidSize(size) => write!(f, "could not parse grid size '{size}'"),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process layout payload: {error}")
            }
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_size(size: &str) -> Result<u32, LayoutTransferError> {
    let parsed = size
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidSize(size.to_owned()))?;

    if parsed == 0 {
        return Err(LayoutTransferError::InvalidSize(size.to_owned()));
    }

    Ok(parsed)
}
