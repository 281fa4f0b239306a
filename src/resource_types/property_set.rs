//! GZPS: a CPF-framed property set describing a Sim's genetic/appearance data —
//! age, family, and hair color among other keys. Thin wrapper over a
//! [`TaggedValueBag`]; unlike XHTN it has no display-name setter.

use std::io::Read;

use crate::error::Result;
use crate::resource_types::hair_tone::HairColor;
use crate::resource_types::property_bag::{PropertyValue, TaggedValueBag};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    pub properties: TaggedValueBag,
}

impl PropertySet {
    pub fn read(reader: &mut impl Read) -> Result<Self> {
        Ok(PropertySet { properties: TaggedValueBag::read(reader)? })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        self.properties.write_to_vec(out)
    }

    pub fn get_age(&self) -> Option<&str> {
        self.properties.get("age").and_then(|v| v.as_str().ok())
    }

    pub fn get_family(&self) -> Option<&str> {
        self.properties.get("family").and_then(|v| v.as_str().ok())
    }

    pub fn set_family(&mut self, family: impl Into<String>) {
        self.properties.set("family", PropertyValue::Str(family.into()));
    }

    /// Sets `genetic` (a float weight) and `hairtone` (the color's GUID string),
    /// matching the two keys the game reads to render this Sim's hair.
    pub fn set_hair_color(&mut self, color: HairColor) {
        let (genetic, guid) = color.genetic_and_guid();
        self.properties.set("genetic", PropertyValue::Float(genetic));
        self.properties.set("hairtone", PropertyValue::Str(guid.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_hair_color_writes_genetic_and_hairtone() {
        let mut set = PropertySet::default();
        set.set_hair_color(HairColor::Black);
        assert_eq!(set.properties.get("genetic").unwrap().as_float().unwrap(), 1.0);
        assert_eq!(
            set.properties.get("hairtone").unwrap().as_str().unwrap(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn set_family_updates_existing_value() {
        let mut set = PropertySet::default();
        set.set_family("Goth");
        assert_eq!(set.get_family(), Some("Goth"));
        set.set_family("Pleasant");
        assert_eq!(set.get_family(), Some("Pleasant"));
    }
}
