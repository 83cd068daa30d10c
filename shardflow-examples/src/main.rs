use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use shardflow_core::{RepartitionConfig, hash_repartition};
use tracing_subscriber::EnvFilter;

const REGIONS: [&str; 5] = ["eu-west", "eu-north", "us-east", "us-west", "ap-south"];

/// Spread synthetic sales rows over N outputs by a hash of the key columns.
#[derive(Debug, Parser)]
#[command(name = "shardflow-demo")]
struct Args {
    /// Number of output streams.
    #[arg(short, long, default_value_t = 4)]
    outputs: usize,

    /// Key columns by name: user_id, region, amount.
    #[arg(short, long, value_delimiter = ',', default_value = "user_id")]
    keys: Vec<String>,

    /// Number of input batches.
    #[arg(short, long, default_value_t = 8)]
    batches: usize,

    /// Rows per input batch.
    #[arg(short, long, default_value_t = 1000)]
    rows: usize,

    /// Distinct user ids in the generated data.
    #[arg(long, default_value_t = 100)]
    users: usize,

    /// Slots per port between stages.
    #[arg(long, default_value_t = 1)]
    capacity: usize,

    /// Run each processor on its own thread.
    #[arg(long)]
    threaded: bool,
}

fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Int64, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
    ]))
}

fn generate(args: &Args) -> anyhow::Result<Vec<RecordBatch>> {
    let users = args.users.max(1) as i64;
    (0..args.batches)
        .map(|b| {
            let start = (b * args.rows) as i64;
            let rows = start..start + args.rows as i64;
            let user_ids: Vec<i64> = rows.clone().map(|r| (r * 7919) % users).collect();
            let regions: Vec<&str> = rows
                .clone()
                .map(|r| REGIONS[r as usize % REGIONS.len()])
                .collect();
            let amounts: Vec<f64> = rows.map(|r| (r % 1000) as f64 / 10.0).collect();
            RecordBatch::try_new(
                schema(),
                vec![
                    Arc::new(Int64Array::from(user_ids)) as ArrayRef,
                    Arc::new(StringArray::from(regions)) as ArrayRef,
                    Arc::new(Float64Array::from(amounts)) as ArrayRef,
                ],
            )
            .with_context(|| format!("build input batch {b}"))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = RepartitionConfig::new(args.outputs, args.keys.iter().map(String::as_str))
        .with_port_capacity(args.capacity);
    tracing::info!(?config, threaded = args.threaded, "repartitioning");

    let input = generate(&args)?;
    let total_rows: usize = input.iter().map(RecordBatch::num_rows).sum();

    let repartition =
        hash_repartition(schema(), input, &config).context("invalid repartition config")?;
    let outputs = if args.threaded {
        repartition.run_threaded()?
    } else {
        repartition.run()?
    };

    println!("{total_rows} rows over {} outputs by {:?}", args.outputs, args.keys);
    for (index, output) in outputs.iter().enumerate() {
        let rows: usize = output.iter().map(RecordBatch::num_rows).sum();
        let share = if total_rows == 0 {
            0.0
        } else {
            rows as f64 * 100.0 / total_rows as f64
        };
        println!(
            "output {index}: {rows:>8} rows in {:>4} batches ({share:5.1}%)",
            output.len()
        );
    }

    Ok(())
}
