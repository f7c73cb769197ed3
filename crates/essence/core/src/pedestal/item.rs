/// A host item stack held by a pedestal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Host material name, e.g. `DIAMOND_CHESTPLATE`.
    pub material: String,
    pub amount: u32,
    pub infusion: Option<Infusion>,
}

/// Permanent attribute written onto retrieved items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Infusion {
    pub tier: u8,
    pub protection_percent: u8,
}

impl Item {
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            infusion: None,
        }
    }

    pub fn is_infusable(&self) -> bool {
        is_infusable(&self.material)
    }
}

/// Armor pieces, compasses, shields, and elytra.
pub fn is_infusable(material: &str) -> bool {
    const ARMOR_SUFFIXES: [&str; 4] = ["_HELMET", "_CHESTPLATE", "_LEGGINGS", "_BOOTS"];
    const SPECIAL: [&str; 3] = ["COMPASS", "SHIELD", "ELYTRA"];

    let material = material.to_ascii_uppercase();
    ARMOR_SUFFIXES.iter().any(|suffix| material.ends_with(suffix))
        || SPECIAL.contains(&material.as_str())
}
