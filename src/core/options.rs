use std::f64::consts::PI;

use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::types::{Metric, Report};

const DAYS_PER_YEAR: f64 = 365.0;

pub const SPOT: NumberField = NumberField::new("spot", "Underlying price", 0.0).unit("$");
pub const STRIKE: NumberField = NumberField::new("strike", "Strike price", 0.0).unit("$");
pub const TIME: NumberField = NumberField::new("time", "Time to expiry", 0.0);
pub const TIME_UNIT: ChoiceField =
    ChoiceField::new("timeUnit", "Time unit", &["days", "years"], "days");
pub const VOLATILITY: NumberField = NumberField::new("volatility", "Volatility", 0.0)
    .unit("%")
    .range(0.0, 1000.0);
pub const RATE: NumberField = NumberField::new("rate", "Risk-free rate", 0.0)
    .unit("%")
    .range(-100.0, 100.0);
pub const DIVIDEND: NumberField = NumberField::new("dividend", "Dividend yield", 0.0)
    .unit("%")
    .range(0.0, 100.0);

pub const FIELDS: [FieldSpec; 7] = [
    FieldSpec::Number(SPOT),
    FieldSpec::Number(STRIKE),
    FieldSpec::Number(TIME),
    FieldSpec::Choice(TIME_UNIT),
    FieldSpec::Number(VOLATILITY),
    FieldSpec::Number(RATE),
    FieldSpec::Number(DIVIDEND),
];

// All rates as fractions, time in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesInputs {
    pub spot: f64,
    pub strike: f64,
    pub time_years: f64,
    pub volatility: f64,
    pub rate: f64,
    pub dividend_yield: f64,
}

impl BlackScholesInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        let spot = form.number(&SPOT);
        let strike = form.number(&STRIKE);
        let time = form.number(&TIME);
        let time_years = match form.choice(&TIME_UNIT)? {
            "years" => time,
            _ => time / DAYS_PER_YEAR,
        };
        Ok(Self {
            spot,
            strike,
            time_years,
            volatility: form.number(&VOLATILITY) / 100.0,
            rate: form.number(&RATE) / 100.0,
            dividend_yield: form.number(&DIVIDEND) / 100.0,
        })
    }

    fn validate(&self) -> CalcResult<()> {
        require_positive(&SPOT, self.spot)?;
        require_positive(&STRIKE, self.strike)?;
        require_positive(&TIME, self.time_years)?;
        require_positive(&VOLATILITY, self.volatility)
    }
}

fn require_positive(field: &NumberField, value: f64) -> CalcResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::out_of_range(field.key, "must be greater than 0"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackScholesResult {
    pub d1: f64,
    pub d2: f64,
    pub call_price: f64,
    pub put_price: f64,
    pub call_greeks: Greeks,
    pub put_greeks: Greeks,
    pub spot: f64,
    pub strike: f64,
    pub time_years: f64,
}

pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

// Standard normal CDF, Abramowitz & Stegun 26.2.17 (|error| < 7.5e-8).
pub fn norm_cdf(x: f64) -> f64 {
    const P: f64 = 0.231_641_9;
    const B: [f64; 5] = [
        0.319_381_530,
        -0.356_563_782,
        1.781_477_937,
        -1.821_255_978,
        1.330_274_429,
    ];

    let t = 1.0 / (1.0 + P * x.abs());
    let poly = t * (B[0] + t * (B[1] + t * (B[2] + t * (B[3] + t * B[4]))));
    let tail = norm_pdf(x) * poly;
    if x >= 0.0 { 1.0 - tail } else { tail }
}

pub fn black_scholes(inputs: &BlackScholesInputs) -> CalcResult<BlackScholesResult> {
    inputs.validate()?;

    let BlackScholesInputs {
        spot: s,
        strike: k,
        time_years: t,
        volatility: sigma,
        rate: r,
        dividend_yield: q,
    } = *inputs;

    let sqrt_t = t.sqrt();
    let sigma_sqrt_t = sigma * sqrt_t;
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    let d2 = d1 - sigma_sqrt_t;

    let disc_r = (-r * t).exp();
    let disc_q = (-q * t).exp();
    let nd1 = norm_cdf(d1);
    let nd2 = norm_cdf(d2);
    let n_neg_d1 = norm_cdf(-d1);
    let n_neg_d2 = norm_cdf(-d2);
    let pdf_d1 = norm_pdf(d1);

    let call_price = s * disc_q * nd1 - k * disc_r * nd2;
    let put_price = k * disc_r * n_neg_d2 - s * disc_q * n_neg_d1;

    let gamma = disc_q * pdf_d1 / (s * sigma_sqrt_t);
    let vega = s * disc_q * pdf_d1 * sqrt_t / 100.0;
    let decay = -s * pdf_d1 * sigma * disc_q / (2.0 * sqrt_t);

    let call_greeks = Greeks {
        delta: disc_q * nd1,
        gamma,
        theta: (decay - r * k * disc_r * nd2 + q * s * disc_q * nd1) / DAYS_PER_YEAR,
        vega,
        rho: k * t * disc_r * nd2 / 100.0,
    };
    let put_greeks = Greeks {
        delta: disc_q * (nd1 - 1.0),
        gamma,
        theta: (decay + r * k * disc_r * n_neg_d2 - q * s * disc_q * n_neg_d1) / DAYS_PER_YEAR,
        vega,
        rho: -k * t * disc_r * n_neg_d2 / 100.0,
    };

    Ok(BlackScholesResult {
        d1,
        d2,
        call_price,
        put_price,
        call_greeks,
        put_greeks,
        spot: s,
        strike: k,
        time_years: t,
    })
}

impl Report for BlackScholesResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::currency("callPrice", "Call price", self.call_price),
            Metric::currency("putPrice", "Put price", self.put_price),
            Metric::number("d1", "d1", self.d1, 4),
            Metric::number("d2", "d2", self.d2, 4),
            Metric::number("callDelta", "Call delta", self.call_greeks.delta, 4),
            Metric::number("putDelta", "Put delta", self.put_greeks.delta, 4),
            Metric::number("gamma", "Gamma", self.call_greeks.gamma, 4),
            Metric::number("vega", "Vega", self.call_greeks.vega, 4),
            Metric::number("callTheta", "Call theta (per day)", self.call_greeks.theta, 4),
            Metric::number("putTheta", "Put theta (per day)", self.put_greeks.theta, 4),
            Metric::number("callRho", "Call rho", self.call_greeks.rho, 4),
            Metric::number("putRho", "Put rho", self.put_greeks.rho, 4),
        ]
    }

    fn classification(&self) -> Option<String> {
        let label = if (self.spot - self.strike).abs() <= 1e-9 * self.strike {
            "At the money"
        } else if self.spot > self.strike {
            "Call in the money, put out of the money"
        } else {
            "Call out of the money, put in the money"
        };
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn sample() -> BlackScholesInputs {
        BlackScholesInputs {
            spot: 100.0,
            strike: 100.0,
            time_years: 1.0,
            volatility: 0.20,
            rate: 0.05,
            dividend_yield: 0.0,
        }
    }

    #[test]
    fn norm_cdf_reference_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((norm_cdf(1.96) - 0.975_002_1).abs() < 1e-6);
        assert!((norm_cdf(-1.0) - 0.158_655_25).abs() < 1e-6);
        assert!((norm_cdf(3.0) + norm_cdf(-3.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn textbook_at_the_money_prices() {
        let result = black_scholes(&sample()).expect("valid inputs");
        assert!((result.call_price - 10.4506).abs() < 1e-3);
        assert!((result.put_price - 5.5735).abs() < 1e-3);
        assert!((result.call_greeks.delta - 0.6368).abs() < 1e-3);
        assert!((result.put_greeks.delta + 0.3632).abs() < 1e-3);
    }

    #[test]
    fn zero_rate_at_the_money_is_symmetric() {
        let mut inputs = sample();
        inputs.rate = 0.0;
        inputs.time_years = 0.5;
        inputs.volatility = 0.3;
        let result = black_scholes(&inputs).expect("valid inputs");

        let half_width = inputs.volatility * inputs.time_years.sqrt() / 2.0;
        assert!((result.d1 - half_width).abs() < 1e-12);
        assert!((result.d2 + half_width).abs() < 1e-12);
        assert!((result.call_price - result.put_price).abs() < 1e-9);
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let mut inputs = sample();
        inputs.volatility = 0.0;
        let err = black_scholes(&inputs).expect_err("zero volatility must fail");
        assert!(err.to_string().contains("volatility"));

        let mut inputs = sample();
        inputs.time_years = -1.0;
        assert!(black_scholes(&inputs).is_err());

        let mut inputs = sample();
        inputs.spot = f64::NAN;
        assert!(black_scholes(&inputs).is_err());
    }

    proptest! {
        #[test]
        fn prop_put_call_parity_holds(
            spot in 1.0f64..500.0,
            strike in 1.0f64..500.0,
            time_years in 0.01f64..5.0,
            volatility in 0.01f64..1.5,
            rate in -0.02f64..0.15,
            dividend_yield in 0.0f64..0.08,
        ) {
            let inputs = BlackScholesInputs { spot, strike, time_years, volatility, rate, dividend_yield };
            let result = black_scholes(&inputs).expect("valid inputs");
            let forward_gap = spot * (-dividend_yield * time_years).exp()
                - strike * (-rate * time_years).exp();
            prop_assert!((result.call_price - result.put_price - forward_gap).abs() < 1e-6 * spot.max(strike));
            prop_assert!(result.call_greeks.gamma >= 0.0);
            prop_assert!(result.call_greeks.delta >= -1e-12 && result.call_greeks.delta <= 1.0 + 1e-12);
            prop_assert!(result.call_price <= spot + 1e-9);
        }
    }
}
