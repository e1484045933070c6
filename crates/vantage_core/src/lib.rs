//! # VANTAGE Core
//!
//! The world model the viewer orchestrates:
//! - Entities with stable identities and time-queryable positions
//! - Entity collections that announce additions and removals
//! - Data sources carrying optional clock settings
//! - The shared simulation clock
//!
//! ## Ownership
//!
//! Everything observable is handed around as `Arc` handles. The viewer never
//! owns a data source, it subscribes to it and unsubscribes on teardown.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vantage_core::{DataSource, DataSourceCollection, Entity, PositionProperty};
//!
//! let sources = DataSourceCollection::new();
//! let source = DataSource::new("flights");
//! source.entities().add(Entity::new(PositionProperty::constant(origin)));
//! sources.add(source);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod collection;
pub mod data_source;
pub mod entity;

pub use clock::{Clock, ClockRange, ClockStep, SharedClock, SimTime};
pub use collection::{CollectionChange, EntityCollection};
pub use data_source::{
    DataSource, DataSourceClock, DataSourceCollection, DataSourceHandle, DataSourceId,
};
pub use entity::{Entity, EntityHandle, EntityId, PositionProperty};
