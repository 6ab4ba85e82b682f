use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Series {
    D,
    M,
    T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PowerType {
    Diesel,
    Battery,
}

/// A MEWP sub-model, written `<series><power>` in device identities
/// (`ME_DB_07` is a D-series battery unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MewpVariant {
    pub series: Series,
    pub power: PowerType,
}

impl MewpVariant {
    pub const ALL: [MewpVariant; 6] = [
        MewpVariant::new(Series::D, PowerType::Diesel),
        MewpVariant::new(Series::D, PowerType::Battery),
        MewpVariant::new(Series::M, PowerType::Diesel),
        MewpVariant::new(Series::M, PowerType::Battery),
        MewpVariant::new(Series::T, PowerType::Diesel),
        MewpVariant::new(Series::T, PowerType::Battery),
    ];

    pub const fn new(series: Series, power: PowerType) -> Self {
        Self { series, power }
    }

    pub fn code(&self) -> &'static str {
        match (self.series, self.power) {
            (Series::D, PowerType::Diesel) => "DD",
            (Series::D, PowerType::Battery) => "DB",
            (Series::M, PowerType::Diesel) => "MD",
            (Series::M, PowerType::Battery) => "MB",
            (Series::T, PowerType::Diesel) => "TD",
            (Series::T, PowerType::Battery) => "TB",
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.series, self.power) {
            (Series::D, PowerType::Diesel) => "MEWP D-Diesel",
            (Series::D, PowerType::Battery) => "MEWP D-Battery",
            (Series::M, PowerType::Diesel) => "MEWP M-Diesel",
            (Series::M, PowerType::Battery) => "MEWP M-Battery",
            (Series::T, PowerType::Diesel) => "MEWP T-Diesel",
            (Series::T, PowerType::Battery) => "MEWP T-Battery",
        }
    }

    /// Telemetry parameters this variant reports, in display order.
    pub fn parameters(&self) -> &'static [&'static str] {
        match (self.series, self.power) {
            (Series::D, PowerType::Diesel) => &[
                "main_boom_angle",
                "jib_angle",
                "chassis_tilt_angle_x",
                "chassis_tilt_angle_y",
                "hydraulic_oil_temperature",
                "cage_load",
                "engine_speed",
                "coolant_temperature",
                "engine_oil_pressure",
                "engine_working_hours",
            ],
            (Series::D, PowerType::Battery) => &[
                "main_boom_angle",
                "jib_angle",
                "chassis_tilt_angle_x",
                "chassis_tilt_angle_y",
                "soc",
                "cage_load",
                "traction_motor_speed",
                "pump_motor_speed",
                "traction_motor_temperature",
                "pump_motor_temperature",
                "control_battery_voltage",
                "system_battery_voltage",
                "traction_motor_current",
                "pump_motor_current",
                "traction_motor_request_speed",
                "pump_motor_request_speed",
            ],
            (Series::M, _) => &[
                "main_boom_angle",
                "main_boom_extend_length",
                "jib_angle",
                "cage_angle",
                "chassis_tilt_angle_x",
                "chassis_tilt_angle_y",
                "hydraulic_oil_temperature",
                "cage_load",
                "loadchart",
                "engine_speed",
                "actual_torque_percentage",
                "coolant_temperature",
                "engine_oil_pressure",
                "engine_fuel_rate",
                "engine_total_fuel_used",
                "engine_working_hours",
                "engine_request_speed",
            ],
            (Series::T, PowerType::Diesel) => &[
                "main_boom_to_turntable_angle",
                "main_boom_angle_abs_app",
                "main_boom_extend_length",
                "lower_boom_to_turntable_angle",
                "lower_boom_angle_abs_app",
                "lower_boom_extend_length",
                "jib_angle",
                "cage_angle",
                "chassis_tilt_angle_x",
                "chassis_tilt_angle_y",
                "turret_swing_angle",
                "turntable_abs_angle_y_app",
                "cage_swing_angle",
                "hydraulic_oil_temperature",
                "cage_load",
                "loadchart",
                "engine_speed",
                "actual_torque_percentage",
                "coolant_temperature",
                "engine_oil_pressure",
                "engine_fuel_rate",
                "engine_total_fuel_used",
                "engine_working_hours",
                "engine_request_speed",
            ],
            (Series::T, PowerType::Battery) => &[
                "main_boom_angle",
                "main_boom_extend_length",
                "jib_angle",
                "cage_angle",
                "chassis_tilt_angle_x",
                "chassis_tilt_angle_y",
                "turret_swing_angle",
                "cage_swing_angle",
                "hydraulic_oil_temperature",
                "cage_load",
                "loadchart",
                "engine_speed",
                "actual_torque_percentage",
                "coolant_temperature",
                "engine_oil_pressure",
                "engine_fuel_rate",
                "engine_total_fuel_used",
                "engine_working_hours",
                "engine_request_speed",
            ],
        }
    }
}

impl FromStr for MewpVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        MewpVariant::ALL
            .into_iter()
            .find(|v| v.code() == code)
            .ok_or_else(|| s.to_string())
    }
}

/// What kind of equipment an identity names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    TowerLight,
    BatteryPack,
    /// `None` for an `ME_` identity with no recognised variant code.
    Mewp(Option<MewpVariant>),
    Unknown,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::TowerLight => "Tower Light",
            Category::BatteryPack => "Battery Pack",
            Category::Mewp(Some(v)) => v.label(),
            Category::Mewp(None) => "MEWP",
            Category::Unknown => "Unknown",
        }
    }

    /// Short family code used by the dashboards.
    pub fn code(&self) -> &'static str {
        match self {
            Category::TowerLight => "TL",
            Category::BatteryPack => "BA",
            Category::Mewp(_) => "ME",
            Category::Unknown => "Unknown",
        }
    }

    pub fn group(&self) -> Option<EquipmentGroup> {
        match self {
            Category::TowerLight => Some(EquipmentGroup::TowerLight),
            Category::BatteryPack => Some(EquipmentGroup::BatteryPack),
            Category::Mewp(Some(_)) => Some(EquipmentGroup::Mewp),
            Category::Mewp(None) | Category::Unknown => None,
        }
    }

    pub fn variant(&self) -> Option<MewpVariant> {
        match self {
            Category::Mewp(v) => *v,
            _ => None,
        }
    }

    pub fn is_mewp(&self) -> bool {
        matches!(self, Category::Mewp(_))
    }

    /// Which `_`-separated segment of an identity holds the unit number.
    /// MEWP identities carry a variant code before it, even generic ones.
    fn unit_segment(&self) -> Option<usize> {
        match self {
            Category::Mewp(_) => Some(2),
            Category::TowerLight | Category::BatteryPack => Some(1),
            Category::Unknown => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

const PREFIX_TABLE: [(&str, Category); 9] = [
    ("ME_DD", Category::Mewp(Some(MewpVariant::new(Series::D, PowerType::Diesel)))),
    ("ME_DB", Category::Mewp(Some(MewpVariant::new(Series::D, PowerType::Battery)))),
    ("ME_MD", Category::Mewp(Some(MewpVariant::new(Series::M, PowerType::Diesel)))),
    ("ME_MB", Category::Mewp(Some(MewpVariant::new(Series::M, PowerType::Battery)))),
    ("ME_TD", Category::Mewp(Some(MewpVariant::new(Series::T, PowerType::Diesel)))),
    ("ME_TB", Category::Mewp(Some(MewpVariant::new(Series::T, PowerType::Battery)))),
    ("ME_", Category::Mewp(None)),
    ("TL_", Category::TowerLight),
    ("BA_", Category::BatteryPack),
];

/// Classifies an identity by the longest prefix in the table that it starts
/// with. Never fails; identities matching nothing are `Unknown`.
pub fn classify(device_id: &str) -> Category {
    PREFIX_TABLE
        .iter()
        .filter(|(prefix, _)| device_id.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, category)| *category)
        .unwrap_or(Category::Unknown)
}

/// The three equipment families the fleet views filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentGroup {
    Mewp,
    TowerLight,
    BatteryPack,
}

impl EquipmentGroup {
    pub const ALL: [EquipmentGroup; 3] = [
        EquipmentGroup::Mewp,
        EquipmentGroup::TowerLight,
        EquipmentGroup::BatteryPack,
    ];

    /// Estimated revenue per unit, in rupees.
    pub fn revenue_rate(&self) -> u64 {
        match self {
            EquipmentGroup::Mewp => 50_000,
            EquipmentGroup::TowerLight => 50_000,
            EquipmentGroup::BatteryPack => 50_000,
        }
    }

    pub fn contains(&self, device_id: &str) -> bool {
        classify(device_id).group() == Some(*self)
    }
}

impl FromStr for EquipmentGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mewp" => Ok(EquipmentGroup::Mewp),
            "tower-light" => Ok(EquipmentGroup::TowerLight),
            "battery-pack" => Ok(EquipmentGroup::BatteryPack),
            _ => Err(s.to_string()),
        }
    }
}

/// Everything that can be read off an identity string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub category: Category,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_type: Option<PowerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
}

pub fn describe(device_id: &str) -> DeviceInfo {
    let category = classify(device_id);
    let variant = category.variant();
    let unit_number = category
        .unit_segment()
        .and_then(|index| device_id.split('_').nth(index))
        .filter(|unit| !unit.is_empty())
        .map(str::to_string);

    DeviceInfo {
        category,
        code: category.code(),
        variant_code: variant.map(|v| v.code()),
        series: variant.map(|v| v.series),
        power_type: variant.map(|v| v.power),
        unit_number,
    }
}

/// `"engine_oil_pressure"` becomes `"Engine Oil Pressure"`.
pub fn parameter_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parameter_unit(key: &str) -> Option<&'static str> {
    let unit = match key {
        "main_boom_angle" | "jib_angle" | "chassis_tilt_angle_x" | "chassis_tilt_angle_y"
        | "cage_angle" | "turret_swing_angle" | "cage_swing_angle" => "°",
        "hydraulic_oil_temperature"
        | "coolant_temperature"
        | "traction_motor_temperature"
        | "pump_motor_temperature" => "°C",
        "cage_load" => "kg",
        "engine_speed" | "traction_motor_speed" | "pump_motor_speed" => "RPM",
        "engine_oil_pressure" => "bar",
        "soc" | "actual_torque_percentage" | "regulator_level" => "%",
        "control_battery_voltage" | "system_battery_voltage" => "V",
        "traction_motor_current" | "pump_motor_current" => "A",
        "engine_fuel_rate" => "L/h",
        "engine_total_fuel_used" => "L",
        "engine_working_hours" => "hrs",
        "main_boom_extend_length" | "lower_boom_extend_length" => "m",
        _ => return None,
    };
    Some(unit)
}

pub fn parameter_value(key: &str, value: impl fmt::Display) -> String {
    match parameter_unit(key) {
        Some(unit) => format!("{value} {unit}"),
        None => value.to_string(),
    }
}
