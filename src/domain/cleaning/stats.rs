use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

const DEFAULT_PRICING: ModelPricing = ModelPricing {
    input_per_million: 3.00,
    output_per_million: 15.00,
};

/// Known list prices; unknown models are priced like Sonnet.
pub fn pricing_for(model: &str) -> ModelPricing {
    let model = model.to_lowercase();
    if model.contains("haiku") {
        ModelPricing {
            input_per_million: 0.25,
            output_per_million: 1.25,
        }
    } else if model.contains("opus-4-5") || model.contains("opus-4.5") {
        ModelPricing {
            input_per_million: 5.00,
            output_per_million: 25.00,
        }
    } else if model.contains("gpt-4o-mini") {
        ModelPricing {
            input_per_million: 0.15,
            output_per_million: 0.60,
        }
    } else {
        DEFAULT_PRICING
    }
}

/// Counters owned by one cleaning service instance
#[derive(Debug, Default)]
pub struct UsageStats {
    texts_processed: AtomicU64,
    cache_hits: AtomicU64,
    api_calls: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    parse_failures: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub model: String,
    pub texts_processed: u64,
    pub cache_hits: u64,
    /// Percentage of processed texts served from the cache
    pub cache_hit_rate: f64,
    pub api_calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub parse_failures: u64,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

impl UsageStats {
    pub fn record_processed(&self) {
        self.texts_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tokens(&self, input: u64, output: u64) {
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, model: &str) -> UsageSnapshot {
        let texts_processed = self.texts_processed.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);

        let pricing = pricing_for(model);
        let input_cost = input_tokens as f64 / 1_000_000.0 * pricing.input_per_million;
        let output_cost = output_tokens as f64 / 1_000_000.0 * pricing.output_per_million;

        UsageSnapshot {
            model: model.to_string(),
            texts_processed,
            cache_hits,
            cache_hit_rate: round_to(cache_hits as f64 / texts_processed.max(1) as f64 * 100.0, 1),
            api_calls: self.api_calls.load(Ordering::Relaxed),
            input_tokens,
            output_tokens,
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            input_cost_usd: round_to(input_cost, 4),
            output_cost_usd: round_to(output_cost, 4),
            total_cost_usd: round_to(input_cost + output_cost, 4),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
