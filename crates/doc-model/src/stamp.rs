use crate::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampKind {
    #[default]
    Approved,
    Rejected,
    Draft,
    Confidential,
    Urgent,
}

impl StampKind {
    pub const ALL: [StampKind; 5] = [
        StampKind::Approved,
        StampKind::Rejected,
        StampKind::Draft,
        StampKind::Confidential,
        StampKind::Urgent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StampKind::Approved => "APPROVED",
            StampKind::Rejected => "REJECTED",
            StampKind::Draft => "DRAFT",
            StampKind::Confidential => "CONFIDENTIAL",
            StampKind::Urgent => "URGENT",
        }
    }

    pub fn color(self) -> Color {
        match self {
            StampKind::Approved => Color::rgb(0x28, 0xa7, 0x45),
            StampKind::Rejected => Color::rgb(0xdc, 0x35, 0x45),
            StampKind::Draft => Color::rgb(0xff, 0xc1, 0x07),
            StampKind::Confidential => Color::rgb(0x6f, 0x42, 0xc1),
            StampKind::Urgent => Color::rgb(0xfd, 0x7e, 0x14),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_colors_match_css() {
        let css: Vec<String> = StampKind::ALL.iter().map(|kind| kind.color().to_css()).collect();
        assert_eq!(css, ["#28a745", "#dc3545", "#ffc107", "#6f42c1", "#fd7e14"]);
    }
}
