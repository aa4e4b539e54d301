use std::{net::IpAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use log::info;

use loan_default::{
    config::{self, ServeConfig, TrainConfig},
    dataset::DatasetSummary,
    forest::ForestParams,
    service, Trainer,
};

#[derive(Parser)]
#[command(name = "loan-default", version, about = "Loan approval prediction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the classifier on a historical CSV and save it
    Train {
        #[arg(long, env = "DATA_PATH", default_value = config::DEFAULT_DATA_PATH)]
        data: PathBuf,
        #[arg(long, env = "MODEL_PATH", default_value = config::DEFAULT_MODEL_PATH)]
        model: PathBuf,
        #[arg(long, default_value_t = config::DEFAULT_TEST_SIZE)]
        test_size: f64,
        #[arg(long, default_value_t = 60)]
        n_estimators: usize,
        #[arg(long, default_value_t = 8)]
        max_depth: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Serve predictions over HTTP
    Serve {
        #[arg(long, env = "HOST", default_value = config::DEFAULT_HOST)]
        host: IpAddr,
        #[arg(long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
        port: u16,
        #[arg(long, env = "MODEL_PATH", default_value = config::DEFAULT_MODEL_PATH)]
        model: PathBuf,
        /// Comma separated list of allowed origins, `*` for any
        #[arg(long, env = "ALLOW_ORIGINS", default_value = "*")]
        allow_origins: String,
    },
    /// Print missing values and label balance of a historical CSV
    Inspect {
        #[arg(long, env = "DATA_PATH", default_value = config::DEFAULT_DATA_PATH)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Train {
            data,
            model,
            test_size,
            n_estimators,
            max_depth,
            seed,
        } => {
            let config = TrainConfig {
                data_path: data,
                model_path: model,
                test_size,
                forest: ForestParams {
                    n_estimators,
                    max_depth,
                    seed,
                    ..ForestParams::default()
                },
            };

            // training is CPU bound, keep it off the async workers
            let report = tokio::task::spawn_blocking(move || Trainer::new(config)?.run()).await??;
            let eval = report.evaluation;
            info!(
                "done: accuracy {:.4} on {} held-out samples (tp {}, tn {}, fp {}, fn {})",
                eval.accuracy,
                report.test_samples,
                eval.true_positives,
                eval.true_negatives,
                eval.false_positives,
                eval.false_negatives
            );
            let ratio = |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
            info!(
                "precision {}, recall {}",
                ratio(eval.precision()),
                ratio(eval.recall())
            );
        }
        Command::Serve {
            host,
            port,
            model,
            allow_origins,
        } => {
            let config = ServeConfig {
                host,
                port,
                model_path: model,
                allow_origins: config::parse_origins(&allow_origins),
            };
            service::run_server(config).await?;
        }
        Command::Inspect { data } => {
            let summary = DatasetSummary::from_csv(&data)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
