//! Read-only view over the animations published by a setup pass.

use std::fmt;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use crate::config::PlayerVariant;
use crate::error::LoaderError;
use crate::host::{ContainerElement, Host};
use crate::registry::AnimationRecord;
use crate::Result;

/// How `getAnimation` identifies a record.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupKey<E> {
    /// The record id, configured or generated.
    Id(String),
    /// The hosting element itself.
    Container(E),
    /// The `id` attribute of the hosting element.
    ElementId(String),
}

impl<E> LookupKey<E> {
    /// Decode the serializable key shapes: a string, or `{ "elementId": string }`.
    ///
    /// Container keys carry a live element and cannot come from JSON; hosts
    /// build [`LookupKey::Container`] themselves.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::String(id) => Ok(LookupKey::Id(id.clone())),
            JsonValue::Object(map) => match map.get("elementId") {
                Some(JsonValue::String(id)) => Ok(LookupKey::ElementId(id.clone())),
                Some(other) => Err(LoaderError::InvalidLookupKey {
                    reason: format!("elementId must be a string, got {other}"),
                }),
                None => Err(LoaderError::InvalidLookupKey {
                    reason: "expected { container } or { elementId }".into(),
                }),
            },
            other => Err(LoaderError::InvalidLookupKey {
                reason: format!("unsupported key {other}"),
            }),
        }
    }
}

/// The animations, observer and player variant of one completed pass.
pub struct AnimationQuery<H: Host> {
    records: Vec<Rc<AnimationRecord<H>>>,
    variant: PlayerVariant,
    observer: Option<Rc<H::Observer>>,
}

impl<H: Host> AnimationQuery<H> {
    pub fn new(
        records: Vec<Rc<AnimationRecord<H>>>,
        variant: PlayerVariant,
        observer: Option<Rc<H::Observer>>,
    ) -> Self {
        Self {
            records,
            variant,
            observer,
        }
    }

    pub fn get(&self, key: &LookupKey<H::Element>) -> Option<Rc<AnimationRecord<H>>> {
        self.records
            .iter()
            .find(|record| match key {
                LookupKey::Id(id) => record.id() == id,
                LookupKey::Container(element) => record.container() == element,
                LookupKey::ElementId(id) => {
                    record.container().element_id().as_deref() == Some(id.as_str())
                }
            })
            .cloned()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Rc<AnimationRecord<H>>> {
        self.get(&LookupKey::Id(id.to_string()))
    }

    /// Every record, in document order.
    pub fn all(&self) -> Vec<Rc<AnimationRecord<H>>> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn observer(&self) -> Option<&Rc<H::Observer>> {
        self.observer.as_ref()
    }

    pub fn player_variant(&self) -> PlayerVariant {
        self.variant
    }
}

impl<H: Host> fmt::Debug for AnimationQuery<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationQuery")
            .field("records", &self.records)
            .field("variant", &self.variant)
            .field("observing", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_keys_are_ids() {
        let key: LookupKey<()> = LookupKey::from_json(&json!("hero")).unwrap();
        assert_eq!(key, LookupKey::Id("hero".into()));
    }

    #[test]
    fn element_id_objects_are_decoded() {
        let key: LookupKey<()> = LookupKey::from_json(&json!({ "elementId": "banner" })).unwrap();
        assert_eq!(key, LookupKey::ElementId("banner".into()));
    }

    #[test]
    fn other_shapes_are_invalid() {
        for value in [json!(42), json!(null), json!({ "name": "x" }), json!({ "elementId": 1 })] {
            let err = LookupKey::<()>::from_json(&value).unwrap_err();
            assert!(matches!(err, LoaderError::InvalidLookupKey { .. }), "{value}");
        }
    }
}
