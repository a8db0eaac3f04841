use crate::config::Settings;
use crate::data::loader::load_region;
use crate::data::registry::{DataRegistry, Region};
use crate::data::snapshot::{EntityKind, MasterSnapshot};
use crate::data::validate::{validate_snapshot, ValidationSeverity};
use crate::decode::{decode_field_record, FuncType};
use crate::hydrate::{get_entity, ReverseContext, ReverseData, ReverseDepth};
use crate::{logging, server};

const USAGE: &str = "usage: atlas <serve|decode|lookup|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Decode,
    Lookup,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("decode") => Some(Command::Decode),
        Some("lookup") => Some(Command::Lookup),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("config error: {err}");
            return 2;
        }
    };
    logging::init(&settings.log_filter);

    match command {
        Command::Serve => handle_serve(&settings),
        Command::Decode => handle_decode(args, &settings),
        Command::Lookup => handle_lookup(args, &settings),
        Command::Validate => handle_validate(args, &settings),
    }
}

fn handle_serve(settings: &Settings) -> i32 {
    let registry = match DataRegistry::load(&settings.data_dir, &settings.regions) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("failed to load master data: {err}");
            return 1;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };
    match runtime.block_on(server::run_server(settings, registry)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_decode(args: &[String], settings: &Settings) -> i32 {
    let (Some(func_type), Some(raw)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: atlas decode <funcType> <dataVals> [region]");
        return 2;
    };
    let func_type = match func_type.parse::<FuncType>() {
        Ok(func_type) => func_type,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let region = match args.get(4) {
        Some(region) => match region.parse::<Region>() {
            Ok(region) => region,
            Err(err) => {
                eprintln!("{err}");
                return 2;
            }
        },
        None => match settings.regions.first() {
            Some(region) => *region,
            None => {
                eprintln!("no region configured");
                return 2;
            }
        },
    };

    // Dependent functions resolve against master data, same as the server.
    let Some(snapshot) = load_snapshot(settings, region) else {
        return 1;
    };
    match decode_field_record(raw, func_type, &snapshot) {
        Ok(record) => print_json(&record),
        Err(err) => {
            eprintln!("decode failed: {err}");
            1
        }
    }
}

/// Flags after the positional arguments of `lookup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFlags {
    pub reverse: bool,
    pub depth: Option<ReverseDepth>,
    pub data: ReverseData,
    pub root: ReverseData,
}

pub fn parse_lookup_flags(flags: &[String]) -> Result<LookupFlags, String> {
    let mut parsed = LookupFlags {
        reverse: false,
        depth: None,
        data: ReverseData::Nice,
        root: ReverseData::Nice,
    };
    for flag in flags {
        if flag == "--reverse" {
            parsed.reverse = true;
        } else if flag == "--basic" {
            parsed.root = ReverseData::Basic;
        } else if let Some(depth) = flag.strip_prefix("--depth=") {
            parsed.depth = Some(depth.parse()?);
        } else if let Some(data) = flag.strip_prefix("--data=") {
            parsed.data = data.parse()?;
        } else {
            return Err(format!("unknown flag '{flag}'"));
        }
    }
    Ok(parsed)
}

fn handle_lookup(args: &[String], settings: &Settings) -> i32 {
    let (Some(region), Some(kind), Some(id)) = (args.get(2), args.get(3), args.get(4)) else {
        eprintln!(
            "usage: atlas lookup <region> <kind> <id> [--reverse] [--depth=function|skillNp|servant] [--data=basic|nice] [--basic]"
        );
        return 2;
    };
    let parsed = (|| -> Result<(Region, EntityKind, i64, LookupFlags), String> {
        let region = region.parse::<Region>()?;
        let kind = kind.parse::<EntityKind>()?;
        let id = id
            .parse::<i64>()
            .map_err(|_| format!("invalid id '{id}'"))?;
        let flags = parse_lookup_flags(&args[5..])?;
        Ok((region, kind, id, flags))
    })();
    let (region, kind, id, flags) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };

    let Some(snapshot) = load_snapshot(settings, region) else {
        return 1;
    };
    let ctx = ReverseContext::new(
        flags.reverse,
        flags.depth.unwrap_or_else(|| ReverseDepth::default_for(kind)),
        flags.data,
    );
    match get_entity(&snapshot, kind, id, flags.root, ctx) {
        Ok(entity) => print_json(&entity),
        Err(err) => {
            eprintln!("lookup failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String], settings: &Settings) -> i32 {
    let regions = match args.get(2) {
        Some(raw) => match raw.parse::<Region>() {
            Ok(region) => vec![region],
            Err(err) => {
                eprintln!("{err}");
                return 2;
            }
        },
        None => settings.regions.clone(),
    };

    let mut failed = false;
    for region in regions {
        let Some(snapshot) = load_snapshot(settings, region) else {
            failed = true;
            continue;
        };
        let report = validate_snapshot(&snapshot);
        for diag in report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity != ValidationSeverity::Info)
        {
            eprintln!("- [{}] {}: {}", diag.severity, diag.context, diag.message);
        }
        let errors = report.count(ValidationSeverity::Error);
        let warnings = report.count(ValidationSeverity::Warning);
        if report.has_errors() {
            eprintln!("validation failed: {region}: {errors} error(s), {warnings} warning(s)");
            failed = true;
        } else {
            println!("validation passed: {region} ({warnings} warning(s))");
        }
    }
    i32::from(failed)
}

fn load_snapshot(settings: &Settings, region: Region) -> Option<MasterSnapshot> {
    match load_region(&settings.data_dir, region) {
        Ok(tables) => Some(MasterSnapshot::from_tables(region, tables)),
        Err(err) => {
            eprintln!("failed to load master data: {err}");
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["atlas", "decode"])), Some(Command::Decode));
        assert_eq!(parse_command(&args(&["atlas", "lookup"])), Some(Command::Lookup));
        assert_eq!(parse_command(&args(&["atlas", "simulate"])), None);
        assert_eq!(parse_command(&args(&["atlas"])), None);
    }

    #[test]
    fn lookup_flags() {
        let flags =
            parse_lookup_flags(&args(&["--reverse", "--depth=servant", "--data=basic"])).unwrap();
        assert!(flags.reverse);
        assert_eq!(flags.depth, Some(ReverseDepth::Servant));
        assert_eq!(flags.data, ReverseData::Basic);
        assert_eq!(flags.root, ReverseData::Nice);

        assert!(parse_lookup_flags(&args(&["--depth=all"])).is_err());
        assert!(parse_lookup_flags(&args(&["--verbose"])).is_err());
    }
}
