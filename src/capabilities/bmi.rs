//! `calculate-bmi`: body mass index with a declared output schema.
use anyhow::ensure;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::registry::{CapabilityMeta, ToolResponse};

pub const NAME: &str = "calculate-bmi";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmiInput {
    /// Body weight in kilograms.
    pub weight_kg: f64,
    /// Height in meters.
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BmiOutput {
    pub bmi: f64,
}

pub fn meta() -> CapabilityMeta {
    CapabilityMeta::new(NAME)
        .title("BMI Calculator")
        .description("Calculate Body Mass Index")
}

pub fn calculate(input: &BmiInput) -> anyhow::Result<BmiOutput> {
    ensure!(
        input.height_m > 0.0,
        "heightM must be positive, got {}",
        input.height_m
    );
    ensure!(
        input.weight_kg >= 0.0,
        "weightKg must not be negative, got {}",
        input.weight_kg
    );
    let bmi = input.weight_kg / (input.height_m * input.height_m);
    ensure!(
        bmi.is_finite(),
        "measurements out of range: weightKg {} with heightM {}",
        input.weight_kg,
        input.height_m
    );
    Ok(BmiOutput { bmi })
}

pub async fn handle(input: BmiInput) -> anyhow::Result<ToolResponse> {
    let output = calculate(&input)?;
    Ok(ToolResponse::structured(&output)?)
}
