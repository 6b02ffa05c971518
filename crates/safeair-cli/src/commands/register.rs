//! Register command implementation.
//!
//! Fields not given as flags are prompted for on a terminal. With
//! `--no-input`, or when stdin is not a terminal, missing fields are an error.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use safeair_core::ApiClient;
use safeair_types::{OwnerType, RegisterDeviceRequest};

use crate::cli::RegisterArgs;
use crate::format::{FormatOptions, format_registered_text};
use crate::style;
use crate::util::{is_interactive, write_output};

pub async fn cmd_register(
    client: &ApiClient,
    args: RegisterArgs,
    no_input: bool,
    json: bool,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let args = if no_input || !is_interactive() {
        args
    } else {
        prompt_missing(args)?
    };

    let request = build_request(args)?;
    request
        .validate()
        .map_err(|e| anyhow!("Invalid registration: {}", e))?;

    let spinner = (!quiet).then(|| style::operation_spinner("Registering device..."));
    let result = client.register_device(&request).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let created = result.map_err(|e| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        anyhow!("{}\nTime: {}", e, timestamp)
    })?;
    tracing::info!(device_uid = %request.device_uid, id = ?created.id, "Device registered");

    let content = if json {
        opts.as_json(&created)?
    } else {
        format_registered_text(&request.device_uid, &created, opts)
    };
    write_output(output, &content)?;
    Ok(())
}

/// Flags of the required fields that are still unset.
fn missing_flags(args: &RegisterArgs) -> Vec<&'static str> {
    let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
    let mut missing = Vec::new();
    if blank(&args.uid) {
        missing.push("--uid");
    }
    if args.owner_type.is_none() {
        missing.push("--owner-type");
    }
    if blank(&args.owner_name) {
        missing.push("--owner-name");
    }
    if blank(&args.email) {
        missing.push("--email");
    }
    if blank(&args.phone) {
        missing.push("--phone");
    }
    if args.lat.is_none() {
        missing.push("--lat");
    }
    if args.lng.is_none() {
        missing.push("--lng");
    }
    if blank(&args.phone_model) {
        missing.push("--phone-model");
    }
    missing
}

/// Turn complete arguments into a request.
fn build_request(args: RegisterArgs) -> Result<RegisterDeviceRequest> {
    let missing = missing_flags(&args);
    if !missing.is_empty() {
        bail!(
            "Missing required fields: {}\n\
             Pass them as flags, or run without --no-input on a terminal to be prompted.",
            missing.join(", ")
        );
    }
    let text = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
    Ok(RegisterDeviceRequest {
        device_uid: text(args.uid),
        owner_type: args.owner_type.unwrap_or_default(),
        owner_name: text(args.owner_name),
        owner_email: text(args.email),
        owner_phone: text(args.phone),
        initial_latitude: args.lat.unwrap_or_default(),
        initial_longitude: args.lng.unwrap_or_default(),
        phone_model: text(args.phone_model),
    })
}

/// Ask for every field that was not given as a flag.
fn prompt_missing(mut args: RegisterArgs) -> Result<RegisterArgs> {
    let theme = ColorfulTheme::default();

    if args.uid.is_none() {
        args.uid = Some(prompt_text(&theme, "Device UID", false)?);
    }
    if args.owner_type.is_none() {
        let items: Vec<&str> = OwnerType::ALL.iter().map(|t| t.display_name()).collect();
        let selection = Select::with_theme(&theme)
            .with_prompt("Owner type")
            .items(&items)
            .default(0)
            .interact()
            .context("Failed to get user selection")?;
        args.owner_type = Some(OwnerType::ALL[selection]);
    }
    if args.owner_name.is_none() {
        args.owner_name = Some(prompt_text(&theme, "Owner name", false)?);
    }
    if args.email.is_none() {
        args.email = Some(prompt_text(&theme, "Contact email", false)?);
    }
    if args.phone.is_none() {
        args.phone = Some(prompt_text(&theme, "Contact phone", false)?);
    }
    if args.lat.is_none() {
        args.lat = Some(prompt_coordinate(&theme, "Latitude", 90.0)?);
    }
    if args.lng.is_none() {
        args.lng = Some(prompt_coordinate(&theme, "Longitude", 180.0)?);
    }
    if args.phone_model.is_none() {
        args.phone_model = Some(prompt_text(&theme, "Phone model", false)?);
    }
    Ok(args)
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, allow_empty: bool) -> Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn prompt_coordinate(theme: &ColorfulTheme, prompt: &str, limit: f64) -> Result<f64> {
    Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(move |value: &f64| -> Result<(), String> {
            if (-limit..=limit).contains(value) {
                Ok(())
            } else {
                Err(format!("Must be between -{} and {}", limit, limit))
            }
        })
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}
