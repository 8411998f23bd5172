//! `boxsmith export`: compile one profile and hand it to the sink.

use boxsmith_core::sink::{self, Delivery};
use boxsmith_core::{DeliveryMethod, EntityId};

use crate::cli::{ExportArgs, GlobalOpts, MethodArg, OutputFormat};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: ExportArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let method = match args.method {
        Some(MethodArg::Direct) => DeliveryMethod::Direct,
        Some(MethodArg::Oss) => DeliveryMethod::ObjectStore,
        None => resolved.config.sink.method,
    };
    if args.out_file.is_some() && method != DeliveryMethod::Direct {
        return Err(CliError::Validation {
            field: "--out-file".into(),
            reason: "only applies to direct delivery".into(),
        });
    }

    let store = resolved.open_store(global).await?;
    let options = resolved.compile_options(global)?;
    let compiled =
        super::compile_profile(&store, EntityId::new(args.profile), options, global.user).await?;
    output::print_omissions(&compiled.omitted, resolved.color, global.quiet);

    if let Some(path) = args.out_file {
        tokio::fs::write(&path, compiled.to_json()).await?;
        if !global.quiet {
            eprintln!("Wrote {} to {}", compiled.file_name(), path.display());
        }
        return Ok(());
    }

    let mut object_store = resolved.config.object_store();
    if let Some(root) = args.object_root {
        object_store.root = Some(root);
    }
    if let Some(domain) = args.public_domain {
        object_store.public_domain = Some(domain);
    }

    let delivery = sink::deliver(&compiled, method, &object_store).await?;

    let out = match resolved.output {
        // The document itself is the interesting output of a direct export
        OutputFormat::Table | OutputFormat::Plain => match &delivery {
            Delivery::Direct { content, .. } => content.clone(),
            Delivery::ObjectStore { url, .. } => url.clone(),
        },
        format => output::render_single(format, &delivery, |_| Ok(String::new()), |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
