//! The version-layered symbol table (spec.md §9 open question: "how do
//! 2.0/3.0/3.1 extend the 1.0 grammar?"). Resolution: rather than one
//! parser struct per version, there is a single unified grammar whose
//! every construct is gated by a minimum [`XPathVersion`] checked against
//! [`crate::static_context::StaticContext::xpath_version`] at parse time —
//! a 1.0-mode parse simply raises `XPST0003` the moment it would need a
//! construct introduced later (FLWOR, maps/arrays, arrow, lookup, inline
//! functions, sequence-type syntax).

/// Binding powers, low to high (spec.md §4.2). Gaps are left between tiers
/// so a later addition doesn't require renumbering everything below it.
pub const BP_OR: u8 = 10;
pub const BP_AND: u8 = 20;
pub const BP_COMPARISON: u8 = 30;
pub const BP_RANGE: u8 = 35;
pub const BP_ADDITIVE: u8 = 40;
pub const BP_MULTIPLICATIVE: u8 = 50;
pub const BP_UNION: u8 = 60;
pub const BP_INTERSECT_EXCEPT: u8 = 65;
pub const BP_INSTANCE_OF: u8 = 70;
pub const BP_UNARY: u8 = 75;
pub const BP_SIMPLE_MAP: u8 = 80;
pub const BP_ARROW: u8 = 85;
pub const BP_PATH: u8 = 90;
pub const BP_POSTFIX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum XPathVersion {
    V1_0,
    V2_0,
    V3_0,
    V3_1,
}

impl XPathVersion {
    pub fn at_least(&self, other: XPathVersion) -> bool {
        *self >= other
    }
}

impl Default for XPathVersion {
    fn default() -> Self {
        XPathVersion::V3_1
    }
}
