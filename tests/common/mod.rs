//! Synthetic house price frames shared by the integration tests

use polars::prelude::*;

const ZONING: [&str; 3] = ["RL", "RM", "FV"];
const EXTERIOR: [&str; 7] = ["VinylSd", "HdBoard", "MetalSd", "Wd Sdng", "Plywood", "Stone", "BrkFace"];
const QUALITY: [&str; 5] = ["Ex", "Gd", "TA", "Fa", "Po"];
const SALE_TYPES: [&str; 5] = ["WD", "New", "COD", "CWD", "WD"];

/// `n` rows in the Kaggle house prices layout. `SalePrice` grows with
/// living area and heating quality so forests have something to learn.
#[allow(dead_code)]
pub fn housing_frame(n: usize) -> DataFrame {
    let ids: Vec<i64> = (1..=n as i64).collect();
    let zoning: Vec<&str> = (0..n).map(|i| ZONING[i % 3]).collect();
    let lot_frontage: Vec<Option<i64>> = (0..n)
        .map(|i| if i % 7 == 3 { None } else { Some(50 + (i as i64 * 13) % 40) })
        .collect();
    let lot_area: Vec<i64> = (0..n).map(|i| 7000 + (i as i64 * 379) % 6000).collect();
    let utilities: Vec<&str> = (0..n).map(|i| if i == 5 { "NoSeWa" } else { "AllPub" }).collect();
    let exterior1: Vec<&str> = (0..n).map(|i| EXTERIOR[i % 7]).collect();
    let exterior2: Vec<&str> = (0..n).map(|i| EXTERIOR[(i + 2) % 7]).collect();
    let heating_qc: Vec<&str> = (0..n).map(|i| QUALITY[(i * 3) % 5]).collect();
    let exter_cond: Vec<&str> = (0..n).map(|i| QUALITY[(i + 1) % 5]).collect();
    let bsmt_cond: Vec<Option<&str>> = (0..n)
        .map(|i| if i % 11 == 0 { None } else { Some(QUALITY[i % 4]) })
        .collect();
    let sale_type: Vec<&str> = (0..n).map(|i| SALE_TYPES[i % 5]).collect();
    let functional: Vec<&str> = (0..n).map(|i| if i % 6 == 0 { "Min1" } else { "Typ" }).collect();
    let electrical: Vec<Option<&str>> = (0..n)
        .map(|i| match i % 9 {
            0 => None,
            1 => Some("FuseA"),
            _ => Some("SBrkr"),
        })
        .collect();
    let roof_style: Vec<&str> = (0..n).map(|i| if i % 4 == 0 { "Hip" } else { "Gable" }).collect();
    let condition1: Vec<&str> = (0..n).map(|i| if i % 5 == 0 { "Feedr" } else { "Norm" }).collect();
    let gr_liv_area: Vec<i64> = (0..n).map(|i| 900 + (i as i64 * 211) % 1600).collect();
    let garage_area: Vec<i64> = gr_liv_area.iter().map(|a| a / 3).collect();
    let total_bsmt: Vec<i64> = gr_liv_area.iter().map(|a| a * 2 / 3 + 40).collect();
    let year_built: Vec<i64> = (0..n).map(|i| 1950 + (i as i64 * 7) % 60).collect();
    let sale_price: Vec<f64> = (0..n)
        .map(|i| {
            let quality_bonus = match QUALITY[(i * 3) % 5] {
                "Ex" | "Gd" => 25_000.0,
                "TA" => 10_000.0,
                _ => 0.0,
            };
            40_000.0 + 90.0 * gr_liv_area[i] as f64 + quality_bonus
        })
        .collect();

    df!(
        "Id" => ids,
        "MSZoning" => zoning,
        "LotFrontage" => lot_frontage,
        "LotArea" => lot_area,
        "Utilities" => utilities,
        "Exterior1st" => exterior1,
        "Exterior2nd" => exterior2,
        "HeatingQC" => heating_qc,
        "ExterCond" => exter_cond,
        "BsmtCond" => bsmt_cond,
        "SaleType" => sale_type,
        "Functional" => functional,
        "Electrical" => electrical,
        "RoofStyle" => roof_style,
        "Condition1" => condition1,
        "GrLivArea" => gr_liv_area,
        "GarageArea" => garage_area,
        "TotalBsmtSF" => total_bsmt,
        "YearBuilt" => year_built,
        "SalePrice" => sale_price,
    )
    .unwrap()
}
