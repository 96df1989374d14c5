//! Synthetic traffic replay for the stats pipeline
//!
//! Spins up a dispatcher with a logging listener, reports fake exchanges
//! from several producer threads the way an interceptor would, then prints
//! the per-connectivity usage totals.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use clap::Parser;
use http::{Method, StatusCode};
use tracing::info;
use url::Url;

use reqmon::connectivity::{ConnectivityInfo, ConnectivityType, StaticConnectivity};
use reqmon::dispatch::{LoggingListener, StatsDispatcher};
use reqmon::report::{EventReporter, RequestFacts, ResponseFacts};
use reqmon::types::{BytesReceived, BytesSent, RequestId};

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    about = "Replay synthetic HTTP exchanges through the stats pipeline"
)]
struct Args {
    /// Number of producer threads
    #[arg(long, default_value_t = 4)]
    producers: usize,

    /// Exchanges reported per producer thread
    #[arg(long, default_value_t = 25)]
    requests: usize,

    /// Report every Nth exchange as a failed exchange (0 disables failures)
    #[arg(long, default_value_t = 10)]
    error_every: usize,

    /// Connectivity the resolver reports
    #[arg(long, value_enum, default_value_t = ConnectivityType::Wifi)]
    connectivity: ConnectivityType,
}

fn main() -> Result<()> {
    reqmon::logging::init_logging();
    let args = Args::parse();

    let dispatcher = StatsDispatcher::new(StaticConnectivity::new(ConnectivityInfo::new(
        args.connectivity,
    )))?;
    dispatcher.add_listener(Arc::new(LoggingListener));

    info!(
        producers = args.producers,
        requests = args.requests,
        connectivity = %args.connectivity,
        "starting replay"
    );

    let mut producers = Vec::with_capacity(args.producers);
    for producer in 0..args.producers {
        let reporter = EventReporter::new(dispatcher.clone());
        let requests = args.requests;
        let error_every = args.error_every;
        producers.push(thread::spawn(move || {
            for seq in 0..requests {
                let id = RequestId::new((producer * requests + seq) as u64);
                let request = request_facts(id, producer);
                if error_every > 0 && seq % error_every == error_every - 1 {
                    reporter.http_exchange_error(
                        Some(&request),
                        io::Error::new(io::ErrorKind::TimedOut, "simulated connect timeout"),
                    );
                } else {
                    let response = response_facts(id, seq);
                    reporter.response_received(Some(&request), Some(&response));
                }
            }
        }));
    }

    for producer in producers {
        producer
            .join()
            .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;
    }

    dispatcher.flush()?;
    let usage = dispatcher.usage_snapshot()?;
    for row in usage.active_rows() {
        info!(
            connectivity = %row.connectivity,
            requests = row.requests.get(),
            bytes = row.bytes.as_u64(),
            "usage"
        );
    }
    info!(
        total_requests = usage.total_requests(),
        total_bytes = usage.total_bytes(),
        "replay finished"
    );

    dispatcher.shutdown()?;
    Ok(())
}

fn request_facts(id: RequestId, producer: usize) -> RequestFacts {
    let url = Url::parse(&format!(
        "https://api.example.com/v1/producers/{producer}/items"
    ))
    .expect("static url template");
    RequestFacts {
        id,
        host: url.host_str().unwrap_or_default().to_string(),
        url,
        method: Method::GET,
        size: BytesSent::new(200 + (producer as u64) * 16),
    }
}

fn response_facts(id: RequestId, seq: usize) -> ResponseFacts {
    let started_at = SystemTime::now();
    ResponseFacts {
        id,
        size: BytesReceived::new(1024 + (seq as u64) * 64),
        status: StatusCode::OK,
        started_at,
        ended_at: started_at + Duration::from_millis(35),
    }
}
