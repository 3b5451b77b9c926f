//! meshbuf CLI - inspect the built-in primitives through buffer proxies.

use meshbuf::core::{AttributeHost, CollectionLocator, PropertyHost};
use meshbuf::host::{MemoryMesh, MemoryPointCloud};
use meshbuf::util::{Bool, ComponentVec, Dimensions};
use meshbuf::{BufferProxy, Result, UnifiedAttributeProxy};
use serde_json::{json, Value};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const BUILD_DATE: &str = env!("MESHBUF_BUILD_DATE");
const BUILD_TIME: &str = env!("MESHBUF_BUILD_TIME");

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level: Option<&str> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = Some("debug"),
            "-vv" | "--trace" => level = Some("trace"),
            "-q" | "--quiet" => level = Some("error"),
            _ => filtered_args.push(arg),
        }
    }
    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    filtered_args.retain(|&s| s != "--json" && s != "-j");
    if json_mode && level.is_none() {
        level = Some("error");
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        // Info command - collections, element counts and fields
        "info" | "i" => match filtered_args.get(1) {
            Some(name) => open(name).and_then(|p| cmd_info(&p, json_mode)),
            None => usage("info <primitive>"),
        },

        // Attrs command - attribute layer registry
        "attrs" | "a" => match filtered_args.get(1) {
            Some(name) => open(name).and_then(|p| cmd_attrs(&p, json_mode)),
            None => usage("attrs <primitive>"),
        },

        // Dump command - field or layer values
        "dump" | "d" => match (filtered_args.get(1), filtered_args.get(2)) {
            (Some(name), Some(target)) => open(name)
                .and_then(|p| cmd_dump(&p, target, filtered_args.get(3).copied(), json_mode)),
            _ => usage("dump <primitive> <collection> <field> | <layer>"),
        },

        "version" | "--version" | "-V" => {
            println!(
                "meshbuf {} (built {} {})",
                env!("CARGO_PKG_VERSION"),
                BUILD_DATE,
                BUILD_TIME
            );
            Ok(())
        }

        // Help
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn usage(args: &str) -> Result<()> {
    eprintln!("Error: missing arguments");
    eprintln!("Usage: meshbuf {}", args);
    std::process::exit(1);
}

fn print_help() {
    println!("meshbuf - bulk attribute buffers for meshes and point clouds");
    println!();
    println!("USAGE:");
    println!("    meshbuf [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info  <primitive>                    Show collections, element counts and fields");
    println!("    a, attrs <primitive>                    Show attribute layers");
    println!("    d, dump  <primitive> <collection> <field>  Dump one field of a collection");
    println!("    d, dump  <primitive> <layer> [field]    Dump an attribute layer (per face for corner layers)");
    println!("    version                                 Show version and build date");
    println!("    h, help                                 Show this help");
    println!();
    println!("PRIMITIVES:");
    println!("    cube, plane, points");
    println!();
    println!("OPTIONS:");
    println!("    -j, --json       Print JSON instead of text");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    meshbuf info cube");
    println!("    meshbuf dump cube vertices co");
    println!("    meshbuf dump cube \"attributes['UVMap']\" vector --json");
    println!("    meshbuf dump plane UVMap");
    println!();
    println!("NOTES:");
    println!("    - Without -v/-vv/-q the log level is taken from RUST_LOG (default: info)");
}

// ============================================================================
// Primitives
// ============================================================================

enum Primitive {
    Mesh(MemoryMesh),
    Points(MemoryPointCloud),
}

impl Primitive {
    fn host(&self) -> &dyn AttributeHost {
        match self {
            Self::Mesh(m) => m,
            Self::Points(p) => p,
        }
    }

    fn collection_names(&self) -> Vec<String> {
        match self {
            Self::Mesh(m) => m.collection_names(),
            Self::Points(p) => p.collection_names(),
        }
    }

    fn field_names(&self, locator: &CollectionLocator) -> Result<Vec<String>> {
        match self {
            Self::Mesh(m) => m.field_names(locator),
            Self::Points(p) => p.field_names(locator),
        }
    }
}

fn open(name: &str) -> Result<Primitive> {
    info!("Creating primitive: {}", name);
    let primitive = match name {
        "cube" => Primitive::Mesh(MemoryMesh::cube()?),
        "plane" => Primitive::Mesh(MemoryMesh::plane()?),
        "points" => Primitive::Points(MemoryPointCloud::points_grid(4, 4, 0.5)?),
        other => {
            return Err(meshbuf::Error::InvalidArgument(format!(
                "unknown primitive {} (expected cube, plane or points)",
                other
            )))
        }
    };
    Ok(primitive)
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_info(primitive: &Primitive, json_mode: bool) -> Result<()> {
    let host = primitive.host();
    let mut collections = Vec::new();
    for name in primitive.collection_names() {
        let locator = CollectionLocator::named(name.as_str());
        let count = host.element_count(&locator)?;
        let mut fields = Vec::new();
        for field in primitive.field_names(&locator)? {
            let data_type = host.field_type(&locator, &field)?;
            fields.push((field, data_type));
        }
        debug!("{}: {} elements, {} fields", name, count, fields.len());
        collections.push((name, count, fields));
    }

    if json_mode {
        let value: Vec<Value> = collections
            .iter()
            .map(|(name, count, fields)| {
                json!({
                    "name": name,
                    "elements": count,
                    "fields": fields
                        .iter()
                        .map(|(f, t)| json!({ "name": f, "type": t.to_string() }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", json!({ "collections": value }));
        return Ok(());
    }

    println!("Collections:");
    for (name, count, fields) in &collections {
        println!("  {} ({} elements)", name, count);
        for (field, data_type) in fields {
            println!("    {:<16} {}", field, data_type);
        }
    }
    println!();
    println!("Attribute layers: {}", host.num_attributes());
    Ok(())
}

fn cmd_attrs(primitive: &Primitive, json_mode: bool) -> Result<()> {
    let host = primitive.host();
    let mut layers = Vec::new();
    for index in 0..host.num_attributes() {
        let Some(header) = host.attribute_at(index) else {
            continue;
        };
        let count = host.element_count(&host.attribute_locator(&header))?;
        layers.push((index, header, count));
    }

    if json_mode {
        let value: Vec<Value> = layers
            .iter()
            .map(|(index, h, count)| {
                json!({
                    "index": index,
                    "name": h.name,
                    "domain": h.domain.as_str(),
                    "data_type": h.data_kind.as_str(),
                    "storage": h.storage_kind().as_str(),
                    "field": h.default_field(),
                    "elements": count,
                })
            })
            .collect();
        println!("{}", json!({ "attributes": value }));
        return Ok(());
    }

    println!("Attribute layers ({}):", layers.len());
    for (index, h, count) in &layers {
        println!(
            "  [{}] {:<12} {:<8} {:<14} {:<6} {} elements",
            index,
            h.name,
            h.domain,
            h.data_kind,
            h.storage_kind(),
            count
        );
    }
    Ok(())
}

fn cmd_dump(primitive: &Primitive, target: &str, field: Option<&str>, json_mode: bool) -> Result<()> {
    let host = primitive.host();
    let locator = CollectionLocator::parse(target)?;

    // a bare layer name goes through the attribute proxy
    if let CollectionLocator::Named(name) = &locator {
        let is_collection = host.element_count(&locator).is_ok();
        if host.attribute_by_name(name).is_some() && (field.is_none() || !is_collection) {
            return dump_layer(host, name, field, json_mode);
        }
    }

    let field = match (field, &locator) {
        (Some(field), _) => field.to_string(),
        (None, CollectionLocator::Keyed { key, .. }) => host
            .attribute_by_name(key)
            .map(|h| h.default_field().to_string())
            .ok_or_else(|| meshbuf::Error::unknown_attribute_name(key))?,
        (None, CollectionLocator::Named(_)) => {
            return Err(meshbuf::Error::InvalidArgument(format!(
                "dump of {} needs a field name",
                target
            )))
        }
    };

    let mut proxy = BufferProxy::new(host, locator, field);
    proxy.get()?;
    let buffer = proxy.buffer().ok_or(meshbuf::Error::NoBuffer)?;
    let values = rows(buffer, proxy.length());

    if json_mode {
        println!(
            "{}",
            json!({
                "collection": proxy.locator().to_string(),
                "field": proxy.field(),
                "type": buffer.pod().name(),
                "shape": proxy.dims().sizes(),
                "values": values,
            })
        );
        return Ok(());
    }

    println!(
        "{}.{} {} {}",
        proxy.locator(),
        proxy.field(),
        buffer.pod(),
        proxy.dims()
    );
    for (i, row) in values.iter().enumerate() {
        println!("  [{}] {}", i, row);
    }
    Ok(())
}

fn dump_layer(host: &dyn AttributeHost, name: &str, field: Option<&str>, json_mode: bool) -> Result<()> {
    let proxy = UnifiedAttributeProxy::new(host, name, field)?;
    let values = proxy.values();
    let buffer = values.buffer().ok_or(meshbuf::Error::NoBuffer)?;
    let length = values.length();
    let all = rows(buffer, length);

    let mut groups = Vec::with_capacity(proxy.len());
    for i in 0..proxy.len() {
        let range = proxy.rows(i)?;
        groups.push(Value::Array(all[range].to_vec()));
    }

    if json_mode {
        println!(
            "{}",
            json!({
                "attribute": proxy.name(),
                "domain": proxy.domain().as_str(),
                "data_type": proxy.data_kind().as_str(),
                "field": proxy.field(),
                "shape": Dimensions::for_buffer(values.items(), length).sizes(),
                "values": groups,
            })
        );
        return Ok(());
    }

    println!(
        "{} ({} {}) field {} {}",
        proxy.name(),
        proxy.domain(),
        proxy.data_kind(),
        proxy.field(),
        values.dims()
    );
    let unit = if proxy.is_corner() { "face" } else { "element" };
    for (i, group) in groups.iter().enumerate() {
        println!("  {} {}: {}", unit, i, group);
    }
    Ok(())
}

/// One JSON value per element: a number/bool, or an array of components.
fn rows(buffer: &ComponentVec, length: usize) -> Vec<Value> {
    fn shape<T: Copy>(values: &[T], length: usize, f: impl Fn(T) -> Value) -> Vec<Value> {
        values
            .chunks_exact(length.max(1))
            .map(|c| match c {
                [v] => f(*v),
                _ => Value::Array(c.iter().map(|v| f(*v)).collect()),
            })
            .collect()
    }
    match buffer {
        ComponentVec::Bool(v) => shape(v, length, |b: Bool| json!(b.get())),
        ComponentVec::Int(v) => shape(v, length, |i| json!(i)),
        ComponentVec::Float(v) => shape(v, length, |f| json!(f)),
    }
}
