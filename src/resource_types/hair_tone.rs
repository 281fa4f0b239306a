//! XHTN: a CPF-framed hair-tone definition. Like GZPS it wraps a tagged-value bag,
//! but additionally exposes a human-readable display name alongside the genetic
//! weight and GUID that GZPS's `hairtone` key also carries (there as `proxy`).

use std::io::Read;

use crate::error::Result;
use crate::resource_types::property_bag::{PropertyValue, TaggedValueBag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairColor {
    Black,
    Brown,
    Blond,
    Red,
    Grey,
}

impl HairColor {
    /// The `genetic` float weight and the GUID suffix shared between GZPS's
    /// `hairtone` key and XHTN's `proxy` key for this color.
    pub fn genetic_and_guid(self) -> (f32, &'static str) {
        match self {
            HairColor::Black => (1.0, "00000000-0000-0000-0000-000000000001"),
            HairColor::Brown => (1.0, "00000000-0000-0000-0000-000000000002"),
            HairColor::Blond => (2.0, "00000000-0000-0000-0000-000000000003"),
            HairColor::Red => (2.0, "00000000-0000-0000-0000-000000000004"),
            HairColor::Grey => (0.0, "00000000-0000-0000-0000-000000000005"),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            HairColor::Black => "Black",
            HairColor::Brown => "Brown",
            HairColor::Blond => "Blond",
            HairColor::Red => "Red",
            HairColor::Grey => "Grey",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HairTone {
    pub properties: TaggedValueBag,
}

impl HairTone {
    pub fn read(reader: &mut impl Read) -> Result<Self> {
        Ok(HairTone { properties: TaggedValueBag::read(reader)? })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        self.properties.write_to_vec(out)
    }

    pub fn set_family(&mut self, family: impl Into<String>) {
        self.properties.set("family", PropertyValue::Str(family.into()));
    }

    /// Sets `name` (a display label), `genetic`, and `proxy`, mirroring GZPS's
    /// `genetic`/`hairtone` pair under XHTN's own key names.
    pub fn set_hair_color(&mut self, color: HairColor) {
        let (genetic, guid) = color.genetic_and_guid();
        self.properties.set("name", PropertyValue::Str(color.display_name().to_string()));
        self.properties.set("genetic", PropertyValue::Float(genetic));
        self.properties.set("proxy", PropertyValue::Str(guid.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_hair_color_sets_name_genetic_and_proxy() {
        let mut tone = HairTone::default();
        tone.set_hair_color(HairColor::Blond);
        assert_eq!(tone.properties.get("name").unwrap().as_str().unwrap(), "Blond");
        assert_eq!(tone.properties.get("genetic").unwrap().as_float().unwrap(), 2.0);
        assert_eq!(
            tone.properties.get("proxy").unwrap().as_str().unwrap(),
            "00000000-0000-0000-0000-000000000003"
        );
    }

    #[test]
    fn shares_genetic_and_guid_values_with_gzps() {
        use crate::resource_types::property_set::PropertySet;
        let mut gzps = PropertySet::default();
        gzps.set_hair_color(HairColor::Red);
        let mut xhtn = HairTone::default();
        xhtn.set_hair_color(HairColor::Red);

        assert_eq!(gzps.properties.get("genetic"), xhtn.properties.get("genetic"));
        assert_eq!(gzps.properties.get("hairtone"), xhtn.properties.get("proxy"));
    }
}
