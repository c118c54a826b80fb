//! `PackageHandler`: reconstructs a package from raw bytes, checks its
//! direction, and dispatches it to a registered per-kind handler.

use std::collections::HashMap;
use std::marker::PhantomData;

use super::error::PackageHandleError;
use super::package::{DirectionTag, Package, PackageKind};

type HandlerFn = Box<dyn Fn(&[u8]) -> Result<Vec<Package>, PackageHandleError> + Send + Sync>;

/// Dispatches packages bound for direction `D` to handlers registered per
/// `PackageKind`.
pub struct PackageHandler<D> {
    handlers: HashMap<PackageKind, HandlerFn>,
    _direction: PhantomData<D>,
}

impl<D: DirectionTag> PackageHandler<D> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            _direction: PhantomData,
        }
    }

    /// Registers `f` as the handler for `kind`. `f` receives the raw
    /// payload bytes (header already stripped) and returns zero or more
    /// reply packages.
    pub fn register<F>(&mut self, kind: PackageKind, f: F)
    where
        F: Fn(&[u8]) -> Result<Vec<Package>, PackageHandleError> + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(f));
    }

    /// Parses `raw` into a package, verifies its direction matches `D`,
    /// and invokes the registered handler for its kind.
    pub fn handle(&self, raw: &[u8]) -> Result<Vec<Package>, PackageHandleError> {
        let package = Package::from_bytes(raw)?;
        if package.direction() != D::DIRECTION {
            return Err(PackageHandleError::DirectionMismatch);
        }
        let handler = self
            .handlers
            .get(&package.kind())
            .ok_or(PackageHandleError::NoHandler(package.kind()))?;
        handler(package.payload())
    }
}

impl<D: DirectionTag> Default for PackageHandler<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::package::{PackageFactory, ServerBound};

    #[test]
    fn dispatches_to_registered_handler() {
        let mut handler: PackageHandler<ServerBound> = PackageHandler::new();
        handler.register(PackageKind::FullCheck, |_payload| Ok(vec![]));

        let factory: PackageFactory<ServerBound> = PackageFactory::new();
        let pkg = factory.from_object(PackageKind::FullCheck, vec![]);
        let replies = handler.handle(&pkg.to_bytes()).unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn missing_handler_is_reported() {
        let handler: PackageHandler<ServerBound> = PackageHandler::new();
        let factory: PackageFactory<ServerBound> = PackageFactory::new();
        let pkg = factory.from_object(PackageKind::FullCheck, vec![]);
        assert!(matches!(
            handler.handle(&pkg.to_bytes()),
            Err(PackageHandleError::NoHandler(PackageKind::FullCheck))
        ));
    }

    #[test]
    fn direction_mismatch_is_reported() {
        let mut handler: PackageHandler<ServerBound> = PackageHandler::new();
        handler.register(PackageKind::LogText, |_| Ok(vec![]));

        let wrong_factory: PackageFactory<crate::protocol::package::ClientBound> =
            PackageFactory::new();
        let pkg = wrong_factory.from_object(PackageKind::LogText, vec![]);
        assert!(matches!(
            handler.handle(&pkg.to_bytes()),
            Err(PackageHandleError::DirectionMismatch)
        ));
    }
}
