//! Typed field bindings for LIMS entity documents.
//!
//! An entity's state lives in its XML document and nowhere else. The types in
//! this crate read typed values out of that tree on demand and write changes
//! straight back into it, creating missing intermediate elements on write.
//!
//! - Scalar descriptors ([`StringDescriptor`], [`IntegerDescriptor`], ...) are
//!   declared once and applied to a root [`Element`] per call.
//! - Collection bindings ([`XmlList`], [`UdfDictionary`], ...) borrow the root
//!   mutably for as long as they live and keep their view and the tree in step.
//! - Entity references resolve through an [`IdentityCache`], so one URI always
//!   yields one shared [`Entity`].
//!
//! # Example
//!
//! ```
//! use lims_descriptors::{EntityDescriptor, EntityKind, Session, UdfDictionary, UdfValue};
//! use lims_xml::Element;
//!
//! let session = Session::new("http://lims:4040");
//! let mut root = Element::parse(
//!     r#"<smp:sample xmlns:smp="http://genologics.com/ri/sample"
//!                    xmlns:udf="http://genologics.com/ri/userdefined">
//!          <project uri="http://lims:4040/api/v2/projects/p1"/>
//!          <udf:field type="Numeric" name="Volume">12</udf:field>
//!        </smp:sample>"#,
//! )
//! .unwrap();
//!
//! let project = EntityDescriptor::new("project", EntityKind::Project);
//! let p = project.get(&root, &session).unwrap().unwrap();
//! assert_eq!(p.id(), "p1");
//!
//! let mut udfs = UdfDictionary::new(&mut root, &[]);
//! assert_eq!(udfs.get("Volume").unwrap(), Some(UdfValue::Integer(12)));
//! udfs.set("Volume", 15).unwrap();
//! assert!(udfs.set("Volume", "lots").is_err());
//! ```

mod action;
mod dict;
mod elems;
mod entity;
mod error;
mod io_map;
mod list;
mod placement;
mod pooled;
mod queue;
mod reference;
mod scalar;
mod udf;

pub use action::{ActionKey, ActionValue, XmlAction};
pub use dict::{AttributeDict, SubTagDictionary};
pub use entity::{Entity, EntityKind, EntityRef, IdentityCache, Session, SessionConfig};
pub use error::{BindError, Result};
pub use io_map::{InputOutputMapList, IoMapping, IoSide, IoValue};
pub use list::{
    AttributeItem, AttributeList, EntityItem, EntityList, ExternalIdItem, ExternalIdList,
    ItemCodec, OutputPlacement, OutputPlacementItem, OutputPlacementList, ReagentLabelItem,
    ReagentLabelList, StringList, TextItem, XmlList,
};
pub use placement::PlacementDictionary;
pub use pooled::{Pool, PooledInputDict};
pub use queue::{QueuedArtifact, QueuedArtifactList};
pub use reference::{
    EntityAttributeDescriptor, EntityDescriptor, EntityListDescriptor, LocationDescriptor,
};
pub use scalar::{
    BooleanDescriptor, BooleanInput, Dimension, DimensionDescriptor, IntegerDescriptor,
    StringAttributeDescriptor, StringDescriptor, StringDictionaryDescriptor, StringListDescriptor,
};
pub use udf::{UdfDictionary, UdfType, UdfValue};
