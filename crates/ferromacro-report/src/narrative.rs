//! Fixed commentary and the monthly allocation plan.
//!
//! None of this text is derived from loaded data.

use serde::Serialize;

use crate::ReportError;

/// A headed block of numbered points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NarrativeBlock {
    pub heading: &'static str,
    pub points: &'static [&'static str],
}

pub const TREND_COMMENTARY: NarrativeBlock = NarrativeBlock {
    heading: "Trend interpretation",
    points: &[
        "Fed total assets and reserve balances rose sharply after COVID-19, reflecting quantitative easing.",
        "Reverse repo usage grew rapidly, which is closely tied to liquidity conditions in money markets.",
        "SPY and QQQ trend upward over the period but with substantial volatility.",
        "The dollar index (DXY) was strong from mid-2022 and has weakened more recently.",
        "VIX spikes periodically, marking episodes of market instability.",
    ],
};

pub const CORRELATION_COMMENTARY: NarrativeBlock = NarrativeBlock {
    heading: "Correlation interpretation",
    points: &[
        "Fed total assets and reserve balances are highly positively correlated.",
        "SPY and QQQ move together very strongly.",
        "VIX is negatively correlated with most indicators, equities in particular.",
        "The dollar index shows a weak negative correlation with equities.",
    ],
};

pub const STRATEGY_RATIONALE: NarrativeBlock = NarrativeBlock {
    heading: "Strategy rationale",
    points: &[
        "Quantitative tightening is expected to end in the first half of 2024, so liquidity should improve from the second half.",
        "The US 10-year Treasury ETF provides steady returns and a hedge against rate moves.",
        "USD futures and gold futures hedge against economic uncertainty.",
        "The S&P 500 TR and QQQ positions provide exposure to US equity growth.",
        "The lithium and battery ETF invests in future growth industries.",
        "The split between safe and risk assets shifts with economic conditions and market sentiment.",
        "Regular rebalancing manages risk and keeps returns on target.",
    ],
};

pub const SCHEDULE_CAVEAT: &str = "This plan reflects forecasts at the time of writing and should be adjusted \
to actual market conditions. Weights should also follow personal risk tolerance and investment goals.";

pub const TOTAL_BUDGET_KRW: u64 = 80_000_000;

const US_TREASURY_10Y: &str = "KODEX US Treasury 10Y (H)";
const USD_FUTURES: &str = "KODEX USD Futures";
const KOSPI_INVERSE: &str = "KODEX Inverse";
const GOLD_FUTURES: &str = "KODEX Gold Futures (H)";
const SP500_TR: &str = "KODEX US S&P500TR";
const NASDAQ_QQQ: &str = "Invesco QQQ Trust ETF";
const LITHIUM_BATTERY: &str = "TIGER Global Lithium & Battery SOLACTIVE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub instrument: String,
    pub weight_pct: u32,
    pub amount_krw: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAllocation {
    /// `YYYY-MM`.
    pub period: String,
    pub label: String,
    pub holdings: Vec<Holding>,
    pub rationale: String,
}

impl MonthlyAllocation {
    /// Amounts are `budget * weight / 100`.
    pub fn new(
        period: impl Into<String>,
        label: impl Into<String>,
        weights: &[(&str, u32)],
        rationale: impl Into<String>,
        budget_krw: u64,
    ) -> Self {
        Self {
            period: period.into(),
            label: label.into(),
            holdings: weights
                .iter()
                .map(|(instrument, weight_pct)| Holding {
                    instrument: (*instrument).to_owned(),
                    weight_pct: *weight_pct,
                    amount_krw: budget_krw * u64::from(*weight_pct) / 100,
                })
                .collect(),
            rationale: rationale.into(),
        }
    }

    pub fn weight_total(&self) -> u32 {
        self.holdings.iter().map(|holding| holding.weight_pct).sum()
    }

    pub fn amount_total(&self) -> u64 {
        self.holdings.iter().map(|holding| holding.amount_krw).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSchedule {
    pub title: String,
    pub total_budget_krw: u64,
    pub months: Vec<MonthlyAllocation>,
    pub caveat: String,
}

impl AllocationSchedule {
    /// The October 2024 to March 2025 plan on an 80,000,000 KRW budget.
    pub fn default_plan() -> Self {
        let budget = TOTAL_BUDGET_KRW;
        let months = vec![
            MonthlyAllocation::new(
                "2024-10",
                "October 2024",
                &[
                    (US_TREASURY_10Y, 20),
                    (USD_FUTURES, 15),
                    (KOSPI_INVERSE, 10),
                    (SP500_TR, 20),
                    (NASDAQ_QQQ, 20),
                    (LITHIUM_BATTERY, 15),
                ],
                "Equities are expected to rebound as quantitative tightening winds down; \
                 the dollar position guards against further dollar strength.",
                budget,
            ),
            MonthlyAllocation::new(
                "2024-11",
                "November 2024",
                &[
                    (US_TREASURY_10Y, 15),
                    (USD_FUTURES, 15),
                    (KOSPI_INVERSE, 5),
                    (SP500_TR, 25),
                    (NASDAQ_QQQ, 25),
                    (LITHIUM_BATTERY, 15),
                ],
                "Equity momentum is expected to hold, so safe assets are trimmed slightly.",
                budget,
            ),
            MonthlyAllocation::new(
                "2024-12",
                "December 2024",
                &[
                    (US_TREASURY_10Y, 15),
                    (USD_FUTURES, 10),
                    (GOLD_FUTURES, 10),
                    (SP500_TR, 25),
                    (NASDAQ_QQQ, 25),
                    (LITHIUM_BATTERY, 15),
                ],
                "A year-end rally is expected; gold is added against economic uncertainty.",
                budget,
            ),
            MonthlyAllocation::new(
                "2025-01",
                "January 2025",
                &[
                    (US_TREASURY_10Y, 20),
                    (USD_FUTURES, 10),
                    (GOLD_FUTURES, 10),
                    (SP500_TR, 20),
                    (NASDAQ_QQQ, 20),
                    (LITHIUM_BATTERY, 20),
                ],
                "Safe assets grow against new-year uncertainty while the growth-sector weight expands.",
                budget,
            ),
            MonthlyAllocation::new(
                "2025-02",
                "February 2025",
                &[
                    (US_TREASURY_10Y, 25),
                    (USD_FUTURES, 10),
                    (GOLD_FUTURES, 15),
                    (SP500_TR, 15),
                    (NASDAQ_QQQ, 15),
                    (LITHIUM_BATTERY, 20),
                ],
                "Concerns about an economic slowdown raise the safe-asset weight.",
                budget,
            ),
            MonthlyAllocation::new(
                "2025-03",
                "March 2025",
                &[
                    (US_TREASURY_10Y, 30),
                    (USD_FUTURES, 10),
                    (GOLD_FUTURES, 15),
                    (SP500_TR, 15),
                    (NASDAQ_QQQ, 15),
                    (LITHIUM_BATTERY, 15),
                ],
                "Expected rate cuts favor bonds; equity weight stays low against volatility.",
                budget,
            ),
        ];

        Self {
            title: String::from("Monthly ETF allocation (80,000,000 KRW budget)"),
            total_budget_krw: budget,
            months,
            caveat: SCHEDULE_CAVEAT.to_owned(),
        }
    }

    /// Every month must allocate exactly 100% of the budget.
    pub fn validate(&self) -> Result<(), ReportError> {
        for month in &self.months {
            let total = month.weight_total();
            if total != 100 {
                return Err(ReportError::InvalidAllocation {
                    period: month.period.clone(),
                    total_pct: total,
                });
            }
        }
        Ok(())
    }
}

/// `16000000` → `16,000,000 KRW`.
pub fn format_krw(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(" KRW");
    grouped
}
