use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comfort {
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

const fn comfort(label: &'static str, color: &'static str) -> Comfort {
    Comfort {
        label,
        emoji: "☺",
        color,
    }
}

// Exclusive upper bounds, unlike the PM tables.
const TEMPERATURE: [(f64, Comfort); 3] = [
    (18.0, comfort("เย็น", "#2196F3")),
    (26.0, comfort("สบาย", "#4CAF50")),
    (32.0, comfort("อุ่น", "#FFC107")),
];
const HOT: Comfort = comfort("ร้อน", "#4CAF50");

const HUMIDITY: [(f64, Comfort); 3] = [
    (30.0, comfort("แห้งมาก", "#F44336")),
    (50.0, comfort("แห้ง", "#FFC107")),
    (70.0, comfort("เหมาะสม", "#4CAF50")),
];
const HUMID: Comfort = comfort("ชื้น", "#4CAF50");

fn lookup(bands: &[(f64, Comfort)], fallback: Comfort, value: f64) -> Comfort {
    bands
        .iter()
        .find(|(limit, _)| value < *limit)
        .map(|(_, comfort)| *comfort)
        .unwrap_or(fallback)
}

pub fn temperature_comfort(celsius: f64) -> Comfort {
    lookup(&TEMPERATURE, HOT, celsius)
}

pub fn humidity_comfort(percent: f64) -> Comfort {
    lookup(&HUMIDITY, HUMID, percent)
}
