//! `Package`, `PackageKind`, `Direction`, and `PackageFactory`.

use std::marker::PhantomData;

use super::error::PackageCreationError;

/// The lower seven bits of a package's header byte, selecting the payload
/// shape and the handler that processes it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PackageKind {
    LogText = 0x00,
    SendFile = 0x01,
    HashCheck = 0x02,
    FileCheck = 0x03,
    GetFile = 0x04,
    FullCheck = 0x05,
}

impl PackageKind {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(Self::LogText),
            0x01 => Some(Self::SendFile),
            0x02 => Some(Self::HashCheck),
            0x03 => Some(Self::FileCheck),
            0x04 => Some(Self::GetFile),
            0x05 => Some(Self::FullCheck),
            _ => None,
        }
    }

    fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The top bit of a package's header byte: which side the package is
/// bound for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    ToServer,
    ToClient,
}

const DIRECTION_BIT: u8 = 0x80;
const KIND_MASK: u8 = 0x7F;

impl Direction {
    fn bit(self) -> u8 {
        match self {
            Direction::ToServer => DIRECTION_BIT,
            Direction::ToClient => 0,
        }
    }

    fn from_header(header: u8) -> Self {
        if header & DIRECTION_BIT != 0 {
            Direction::ToServer
        } else {
            Direction::ToClient
        }
    }
}

/// A header byte plus an opaque payload. The payload's shape is
/// determined entirely by `(direction, kind)`; decoding it into a concrete
/// type is the caller's job (see `protocol::payload`).
#[derive(Clone, Debug)]
pub struct Package {
    header: u8,
    payload: Vec<u8>,
}

impl Package {
    pub fn direction(&self) -> Direction {
        Direction::from_header(self.header)
    }

    pub fn kind(&self) -> PackageKind {
        PackageKind::from_u8(self.header & KIND_MASK)
            .expect("Package is only constructed through validated paths")
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Serializes this package as `header ‖ payload`. Framing adds the
    /// length prefix around this.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.header);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Splits the header byte from raw package bytes (not a framed
    /// message — framing has already stripped the length prefix by this
    /// point) and validates the kind is recognized.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, PackageCreationError> {
        let (&header, payload) = raw.split_first().ok_or(PackageCreationError::Empty)?;
        PackageKind::from_u8(header & KIND_MASK)
            .ok_or(PackageCreationError::UnknownKind(header & KIND_MASK))?;
        Ok(Self {
            header,
            payload: payload.to_vec(),
        })
    }
}

/// Zero-sized marker naming the direction a `PackageFactory` or
/// `PackageHandler` is parameterized over.
pub trait DirectionTag {
    const DIRECTION: Direction;
}

/// Marker for packages bound for the server (client→server requests).
pub struct ServerBound;
impl DirectionTag for ServerBound {
    const DIRECTION: Direction = Direction::ToServer;
}

/// Marker for packages bound for the client (server→client replies).
pub struct ClientBound;
impl DirectionTag for ClientBound {
    const DIRECTION: Direction = Direction::ToClient;
}

/// Builds packages in the direction fixed by `D`.
pub struct PackageFactory<D> {
    _direction: PhantomData<D>,
}

impl<D> Default for PackageFactory<D> {
    fn default() -> Self {
        Self {
            _direction: PhantomData,
        }
    }
}

impl<D: DirectionTag> PackageFactory<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-encoded payload for `kind` with this factory's
    /// direction.
    pub fn from_object(&self, kind: PackageKind, payload: Vec<u8>) -> Package {
        Package {
            header: D::DIRECTION.bit() | kind.as_u8(),
            payload,
        }
    }

    /// Parses raw bytes (header + payload, no length prefix) into a
    /// package. Does not itself check that the direction matches `D` —
    /// that check belongs to whoever is about to act on the package (see
    /// `PackageHandler::handle`), since a factory is also used to parse
    /// bytes it did not produce.
    pub fn from_bytes(&self, raw: &[u8]) -> Result<Package, PackageCreationError> {
        Package::from_bytes(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_byte_roundtrips_direction_and_kind() {
        let factory: PackageFactory<ServerBound> = PackageFactory::new();
        let pkg = factory.from_object(PackageKind::HashCheck, vec![1, 2, 3]);
        assert_eq!(pkg.direction(), Direction::ToServer);
        assert_eq!(pkg.kind(), PackageKind::HashCheck);
        assert_eq!(pkg.payload(), &[1, 2, 3]);

        let bytes = pkg.to_bytes();
        let parsed = Package::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.direction(), Direction::ToServer);
        assert_eq!(parsed.kind(), PackageKind::HashCheck);
        assert_eq!(parsed.payload(), &[1, 2, 3]);
    }

    #[test]
    fn client_bound_clears_direction_bit() {
        let factory: PackageFactory<ClientBound> = PackageFactory::new();
        let pkg = factory.from_object(PackageKind::LogText, vec![]);
        assert_eq!(pkg.direction(), Direction::ToClient);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = [0x7Fu8]; // direction bit 0, kind 0x7F: not a known kind
        assert!(matches!(
            Package::from_bytes(&raw),
            Err(PackageCreationError::UnknownKind(0x7F))
        ));
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(
            Package::from_bytes(&[]),
            Err(PackageCreationError::Empty)
        ));
    }
}
