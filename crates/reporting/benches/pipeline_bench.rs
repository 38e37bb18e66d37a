//! Benchmark for one full recomputation pass.
//! Run with: cargo bench -p helios-reporting

use chrono::NaiveDate;
use helios_core::selection::FilterSelection;
use helios_core::types::{Dataset, Influencer, InfluencerId, Payout, TrackingEvent};
use helios_reporting::AttributionPipeline;

fn synthetic_dataset(influencers: usize, days: u32) -> Dataset {
    let platforms = ["Instagram", "YouTube", "Twitter"];
    let personas = ["Fitness", "Nutrition", "Bodybuilding", "Lifestyle"];
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default();

    let mut ds = Dataset::default();
    for i in 0..influencers {
        let id = InfluencerId::from(i as u64);
        ds.influencers.push(Influencer {
            influencer_id: id.clone(),
            name: format!("creator-{i:05}"),
            platform: platforms[i % platforms.len()].to_string(),
            persona: personas[i % personas.len()].to_string(),
        });
        ds.payouts.push(Payout {
            influencer_id: id,
            total_payout: 500.0 + (i % 17) as f64 * 75.0,
        });
    }
    for day in 0..days {
        let date = start + chrono::Duration::days(day as i64);
        for n in 0..200 {
            ds.tracking.push(TrackingEvent {
                date,
                influencer_id: None,
                source: "organic".to_string(),
                revenue: 20.0 + (n % 11) as f64,
            });
        }
        for i in (day as usize % 5..influencers).step_by(5) {
            ds.tracking.push(TrackingEvent {
                date,
                influencer_id: Some(InfluencerId::from(i as u64)),
                source: "influencer_campaign".to_string(),
                revenue: 150.0 + (i % 23) as f64 * 9.5,
            });
        }
    }
    ds
}

fn main() {
    let dataset = synthetic_dataset(2_000, 90);
    let selection = match FilterSelection::defaults_for(&dataset) {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("cannot build selection: {e}");
            return;
        }
    };
    let pipeline = AttributionPipeline::default();

    // Warmup
    for _ in 0..5 {
        let _ = pipeline.run(&dataset, &selection);
    }

    // Benchmark
    let iterations = 200u32;
    let start = std::time::Instant::now();

    for _ in 0..iterations {
        let _ = pipeline.run(&dataset, &selection);
    }

    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations;

    println!("=== Attribution Pipeline Benchmark ===");
    println!("Iterations:  {}", iterations);
    println!("Total time:  {:?}", elapsed);
    println!("Per pass:    {:?}", per_iter);
    println!("Throughput:  {:.0} passes/sec", iterations as f64 / elapsed.as_secs_f64());
    println!("Influencers: {}", dataset.influencers.len());
    println!("Events:      {}", dataset.tracking.len());
}
