//! Run command
//!
//! Usage: reportpage run --catalogue <FILE> --page <NAME> [--offset <N>]
//! [--limit <N|max>] [--user <NAME>] [--group <GROUP>]... [--identifiers]

use super::SourceArgs;
use clap::Args;
use reportpage_core::sink::CollectingResolver;
use reportpage_core::{
    EmitMode, ExError, Identity, LimitParam, PageParams, PageResponse, PageRunner, ParamValidator,
};
use reportpage_core_types::RequestContext;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report name (case sensitive)
    #[arg(short, long)]
    pub page: String,

    /// Continuation offset from a previous page
    #[arg(short, long)]
    pub offset: Option<u64>,

    /// Page size, or `max`
    #[arg(short, long)]
    pub limit: Option<LimitParam>,

    /// Acting user name
    #[arg(short, long, default_value = "anonymous")]
    pub user: String,

    /// Group memberships of the acting user
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Forward page identifiers instead of emitting rows
    #[arg(long)]
    pub identifiers: bool,
}

/// Execute run command
pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, registry) = args.source.load()?;

    let identity = args
        .groups
        .iter()
        .fold(Identity::new(args.user.clone()), |id, group| {
            id.with_group(group.clone())
        });
    let ctx = RequestContext::new().with_actor(identity.name.clone());

    let params = PageParams {
        page: args.page,
        offset: args.offset,
        limit: args.limit,
    };
    let validator = ParamValidator::new(
        &registry,
        &config.permissions,
        config.limits,
        config.high_limits_capability.clone(),
    );
    let validated = validator
        .validate(&params, &identity)
        .map_err(|e| ExError::from(e).with_request_id(ctx.request_id.clone()))?;
    for warning in &validated.warnings {
        eprintln!("Warning: {}", warning);
    }

    let runner =
        PageRunner::new(&registry, &config.permissions).with_namespaces(config.namespaces());
    let request = &validated.request;

    let output = if args.identifiers {
        let mut resolver = CollectingResolver::new();
        let result = runner
            .run_in_context(&ctx, request, &identity, EmitMode::Identifiers(&mut resolver))
            .map_err(|e| ExError::from(e).with_request_id(ctx.request_id.clone()))?;
        let namespaces = config.namespaces();
        let titles: Vec<_> = resolver
            .refs()
            .map(|r| namespaces.title_info(r.namespace_id, &r.local_name))
            .collect();
        let disabled = result.header.disabled;
        let mut json = serde_json::to_value(PageResponse::from_result(result, Vec::new()))?;
        if let Some(obj) = json.as_object_mut() {
            obj.remove("results");
            if !disabled {
                obj.insert("titles".to_string(), serde_json::to_value(titles)?);
            }
        }
        json
    } else {
        runner
            .run_buffered_in_context(&ctx, request, &identity, config.max_result_bytes)
            .map_err(|e| ExError::from(e).with_request_id(ctx.request_id.clone()))?
            .to_json()
            .map_err(ExError::from)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
