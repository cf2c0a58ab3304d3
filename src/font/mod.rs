//! # Font Management
//!
//! The renderer only draws with standard PDF fonts, which every viewer ships
//! and which need no embedding. This module maps a font choice to its PDF
//! base-font name and its metrics.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard fonts the report is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub const ALL: [StandardFont; 2] = [StandardFont::Helvetica, StandardFont::HelveticaBold];

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }

    /// Index of this font in a page's resource dictionary (`/F0`, `/F1`).
    pub fn resource_index(&self) -> usize {
        match self {
            Self::Helvetica => 0,
            Self::HelveticaBold => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_is_wider() {
        let regular = StandardFont::Helvetica.metrics().measure_string("Headache", 10.0);
        let bold = StandardFont::HelveticaBold.metrics().measure_string("Headache", 10.0);
        assert!(bold > regular, "bold={bold}, regular={regular}");
    }

    #[test]
    fn resource_indices_are_distinct() {
        assert_ne!(
            StandardFont::Helvetica.resource_index(),
            StandardFont::HelveticaBold.resource_index()
        );
        for (i, font) in StandardFont::ALL.iter().enumerate() {
            assert_eq!(font.resource_index(), i);
        }
    }
}
