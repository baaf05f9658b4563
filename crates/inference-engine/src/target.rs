//! Log-Price Target Transform
//!
//! The regressor is trained on `ln(1 + price)`; predictions must go back
//! through the exact inverse, `exp(x) - 1`.

/// Forward transform applied to training prices
pub fn log_price(price: f64) -> f64 {
    price.ln_1p()
}

/// Inverse of [`log_price`]
pub fn price_from_log(log_price: f64) -> f64 {
    log_price.exp_m1()
}
