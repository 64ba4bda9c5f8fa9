use clap::ValueEnum;
use serde::Deserialize;

use crate::models::StatusTier;

/// A band covers every value up to and including `upper_bound` that an
/// earlier band did not already claim.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub upper_bound: f64,
    pub tier: StatusTier,
}

/// Bands must be listed with strictly ascending upper bounds. Values above
/// the last bound (and NaN) fall into `worst`.
#[derive(Debug)]
pub struct ThresholdTable {
    pub name: &'static str,
    pub bands: &'static [Band],
    pub worst: StatusTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablePreset {
    /// Three bands: safe, risky, dangerous
    #[default]
    Coarse,
    /// Six bands from very good to hazardous
    Fine,
}

impl TablePreset {
    pub fn table(self) -> &'static ThresholdTable {
        match self {
            TablePreset::Coarse => &COARSE,
            TablePreset::Fine => &FINE,
        }
    }
}

const SAFE: StatusTier = StatusTier {
    status: "ปลอดภัย",
    emoji: "😊",
    color: "#4CAF50",
    text_color: "#4CAF50",
    background_color: "#1B5E20",
    advice: "ทุกคนสามารถทำกิจกรรมต่างๆ ได้ตามปกติ",
};

const RISKY: StatusTier = StatusTier {
    status: "เสี่ยง",
    emoji: "😐",
    color: "#FFC107",
    text_color: "#FFC107",
    background_color: "#7D6608",
    advice: "ควรหลีกเลี่ยงกิจกรรมกลางแจ้งหากรู้สึกไม่สบาย",
};

const DANGEROUS: StatusTier = StatusTier {
    status: "อันตราย",
    emoji: "😷",
    color: "#F44336",
    text_color: "#F44336",
    background_color: "#8A160C",
    advice: "ควรหลีกเลี่ยงกิจกรรมกลางแจ้งทุกชนิด",
};

pub static COARSE: ThresholdTable = ThresholdTable {
    name: "coarse",
    bands: &[
        Band {
            upper_bound: 25.0,
            tier: SAFE,
        },
        Band {
            upper_bound: 100.0,
            tier: RISKY,
        },
    ],
    worst: DANGEROUS,
};

pub static FINE: ThresholdTable = ThresholdTable {
    name: "fine",
    bands: &[
        Band {
            upper_bound: 15.0,
            tier: StatusTier {
                status: "ดีมาก",
                emoji: "😄",
                color: "#00BCD4",
                text_color: "#00BCD4",
                background_color: "#006064",
                advice: "อากาศดีมาก เหมาะกับกิจกรรมกลางแจ้งทุกประเภท",
            },
        },
        Band {
            upper_bound: 25.0,
            tier: StatusTier {
                status: "ดี",
                ..SAFE
            },
        },
        Band {
            upper_bound: 37.5,
            tier: StatusTier {
                status: "ปานกลาง",
                ..RISKY
            },
        },
        Band {
            upper_bound: 50.0,
            tier: StatusTier {
                status: "เริ่มมีผลกระทบต่อสุขภาพ",
                emoji: "🙁",
                color: "#FF9800",
                text_color: "#FF9800",
                background_color: "#8A4B00",
                advice: "กลุ่มเสี่ยงควรลดระยะเวลาทำกิจกรรมกลางแจ้ง",
            },
        },
        Band {
            upper_bound: 90.0,
            tier: StatusTier {
                status: "มีผลกระทบต่อสุขภาพ",
                ..DANGEROUS
            },
        },
    ],
    worst: StatusTier {
        status: "อันตรายมาก",
        emoji: "☠️",
        color: "#9C27B0",
        text_color: "#CE93D8",
        background_color: "#4A148C",
        advice: "ทุกคนควรงดกิจกรรมกลางแจ้งและสวมหน้ากากป้องกันฝุ่น",
    },
};

pub fn classify(table: &ThresholdTable, value: f64) -> StatusTier {
    table
        .bands
        .iter()
        .find(|band| band.upper_bound >= value)
        .map(|band| band.tier)
        .unwrap_or(table.worst)
}

pub fn indicator_color(table: &ThresholdTable, value: f64) -> &'static str {
    classify(table, value).color
}
