// Quotes a booking draft against an offering and optionally submits it
//
// Usage: booking-quote <offering.json> <draft.json> [--submit]

use anyhow::{bail, Context, Result};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;
use travel_booking_core::{
    BookingDraft, BookingFlow, BookingRequestAssembler, BookingValidator, EngineConfig,
    HttpBookingGateway, ServiceOffering,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let submit = args.iter().any(|arg| arg == "--submit");
    let paths: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();
    let [offering_path, draft_path] = paths.as_slice() else {
        bail!("usage: booking-quote <offering.json> <draft.json> [--submit]");
    };

    let config = EngineConfig::from_env()?;
    let offering: ServiceOffering = serde_json::from_str(
        &fs::read_to_string(offering_path)
            .with_context(|| format!("reading offering {}", offering_path))?,
    )
    .context("parsing offering")?;
    let draft = BookingDraft::from_json(
        &fs::read_to_string(draft_path).with_context(|| format!("reading draft {}", draft_path))?,
        config.default_payment_method,
    )
    .context("parsing booking draft")?;

    let validated = match BookingValidator::new().validate(&draft, &offering) {
        Ok(validated) => validated,
        Err(err) => bail!("{}", err),
    };
    println!("{}", serde_json::to_string_pretty(&validated.breakdown)?);

    let assembled = BookingRequestAssembler::new().assemble(&validated)?;
    println!("{}", serde_json::to_string_pretty(&assembled.request)?);

    if submit {
        info!(base_url = %config.gateway.base_url, "submitting to booking gateway");
        let flow = BookingFlow::new(HttpBookingGateway::new(config.gateway)?);
        match flow.submit(&draft, &offering).await {
            Ok(confirmation) => println!("Booked: {}", confirmation.booking_number),
            Err(err) => bail!("{}", err.user_message()),
        }
    }

    Ok(())
}
