//! Output variants producible from one entry file.

use serde::{Deserialize, Serialize};

/// One distinct output form of an entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Plain,
    Minified,
    Coverage,
}

impl Variant {
    /// Fixed planning order. The first requested variant claims the unsuffixed name.
    pub const ALL: [Variant; 3] = [Variant::Plain, Variant::Minified, Variant::Coverage];

    /// Marker inserted before the output extension when this variant shares an
    /// entry file with an earlier one.
    pub fn marker(self) -> &'static str {
        match self {
            Variant::Plain => "",
            Variant::Minified => ".min",
            Variant::Coverage => ".coverage",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Plain => "plain",
            Variant::Minified => "minified",
            Variant::Coverage => "coverage",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of variants requested for every entry file of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variants {
    pub plain: bool,
    pub minified: bool,
    pub coverage: bool,
}

impl Variants {
    pub fn new(plain: bool, minified: bool, coverage: bool) -> Self {
        Self {
            plain,
            minified,
            coverage,
        }
    }

    pub fn contains(&self, variant: Variant) -> bool {
        match variant {
            Variant::Plain => self.plain,
            Variant::Minified => self.minified,
            Variant::Coverage => self.coverage,
        }
    }

    /// Requested variants in planning order; nothing requested means plain only.
    pub fn requested(&self) -> Vec<Variant> {
        let requested: Vec<Variant> = Variant::ALL
            .into_iter()
            .filter(|v| self.contains(*v))
            .collect();

        if requested.is_empty() {
            vec![Variant::Plain]
        } else {
            requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_plain() {
        assert_eq!(Variants::default().requested(), vec![Variant::Plain]);
    }

    #[test]
    fn test_requested_order_is_fixed() {
        let all = Variants::new(true, true, true);
        assert_eq!(
            all.requested(),
            vec![Variant::Plain, Variant::Minified, Variant::Coverage]
        );

        let no_plain = Variants::new(false, true, true);
        assert_eq!(
            no_plain.requested(),
            vec![Variant::Minified, Variant::Coverage]
        );
    }

    #[test]
    fn test_markers_are_distinct() {
        assert_eq!(Variant::Plain.marker(), "");
        assert_ne!(Variant::Minified.marker(), Variant::Coverage.marker());
    }
}
