use std::process::ExitCode;

use clap::{Parser, Subcommand};
use classlens_base::{
    class::{ClassFileIndexError, TypeTag},
    data::{class_cache::ClassCache, class_file_loader::ClassFileLoader},
    id::{ClassId, ClassStatus, MethodId, MethodIndex},
    ClassFile,
};
use classlens_class_loaders::SearchPath;
use tracing_subscriber::{
    fmt::{self, format::DefaultFields, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
};

mod formatter;

pub const ENV_TRACING_LEVEL: &str = "CLASSLENS_LOG";
pub const ENV_LOG_CONSOLE: &str = "CLASSLENS_LOG_CONSOLE";
pub const ENV_LOG_FILE: &str = "CLASSLENS_LOG_FILE";
pub const DEFAULT_TRACING_LEVEL: tracing::Level = tracing::Level::WARN;
const LOG_FILE_PATH: &str = "./classlens.log";

#[derive(Debug, Parser)]
#[clap(name = "classlens")]
#[clap(version = "0.1.0")]
#[clap(about = "Inspect class files the way a debugger sees them")]
#[clap(propagate_version = true)]
struct CliArgs {
    /// Directories and jars to search for classes in, in order.
    /// Each may itself be a class path with several entries.
    #[clap(
        short,
        long,
        global = true,
        multiple_occurrences = true,
        default_value = "."
    )]
    classpath: Vec<String>,
    #[clap(subcommand)]
    command: CliCommands,
}

#[derive(Debug, Subcommand)]
enum CliCommands {
    /// Print the header, fields and methods of a class
    Dump {
        #[clap(value_name = "CLASS")]
        class_name: String,
    },
    /// Print the lines that a breakpoint can be put on, for each method
    Lines {
        #[clap(value_name = "CLASS")]
        class_name: String,
        /// Only show methods with this name
        #[clap(short, long)]
        method: Option<String>,
    },
    /// Print where to put breakpoints to step over the line at an offset
    Step {
        #[clap(value_name = "CLASS")]
        class_name: String,
        #[clap(value_name = "METHOD_INDEX")]
        method_index: MethodIndex,
        #[clap(value_name = "OFFSET")]
        offset: u32,
    },
    /// List the classes and packages directly inside of a package
    Ls {
        #[clap(value_name = "PACKAGE")]
        package: String,
    },
}

pub struct FrontendConfig {
    pub tracing_level: tracing::Level,
    pub log_console: bool,
    pub log_file: bool,
}
impl FrontendConfig {
    #[must_use]
    pub fn new() -> FrontendConfig {
        let tracing_level = std::env::var(ENV_TRACING_LEVEL)
            .ok()
            .and_then(|level| parse_tracing_level(&level))
            .unwrap_or(DEFAULT_TRACING_LEVEL);
        let is_enabled = |var: &str| std::env::var(var).map(|x| x != "0").unwrap_or(true);

        FrontendConfig {
            tracing_level,
            log_console: is_enabled(ENV_LOG_CONSOLE),
            log_file: is_enabled(ENV_LOG_FILE),
        }
    }
}
impl Default for FrontendConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_tracing_level(level: &str) -> Option<tracing::Level> {
    if level.eq_ignore_ascii_case("trace") || level == "*" {
        Some(tracing::Level::TRACE)
    } else if level.eq_ignore_ascii_case("debug") {
        Some(tracing::Level::DEBUG)
    } else if level.eq_ignore_ascii_case("info") {
        Some(tracing::Level::INFO)
    } else if level.eq_ignore_ascii_case("warn") {
        Some(tracing::Level::WARN)
    } else if level.eq_ignore_ascii_case("error") {
        Some(tracing::Level::ERROR)
    } else {
        None
    }
}

struct EmptyWriter;
impl std::io::Write for EmptyWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn make_log_file() -> Option<std::sync::Arc<std::fs::File>> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_FILE_PATH);
    match log_file {
        Ok(log_file) => Some(std::sync::Arc::new(log_file)),
        Err(err) => {
            eprintln!("Failed to open log file {}: {}", LOG_FILE_PATH, err);
            None
        }
    }
}

/// A layer that writes events to `writer` in the compact format
fn log_layer<S, W>(writer: W) -> fmt::Layer<S, DefaultFields, formatter::Formatter, W>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: MakeWriter + 'static,
{
    fmt::Layer::default()
        .with_writer(writer)
        .event_format(formatter::Formatter)
}

fn init_logging(conf: &FrontendConfig) {
    let console_layer = conf.log_console.then(|| log_layer(std::io::stderr));
    let file_layer = if conf.log_file {
        make_log_file().map(log_layer)
    } else {
        None
    };

    let t_subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(conf.tracing_level)
        .without_time()
        .event_format(formatter::Formatter)
        .with_writer(|| EmptyWriter)
        .finish()
        .with(console_layer)
        .with(file_layer);

    if let Err(err) = tracing::subscriber::set_global_default(t_subscriber) {
        eprintln!("Failed to set the tracing subscriber: {}", err);
    }
}

fn main() -> ExitCode {
    // Note that clap autoexits if it didn't get a thing to do
    let args = CliArgs::parse();

    let conf = FrontendConfig::new();
    init_logging(&conf);

    let mut search_path = SearchPath::new();
    for class_path in &args.classpath {
        search_path.add_class_path(class_path);
    }
    tracing::debug!("Searching {} roots", search_path.roots().len());

    let res = match &args.command {
        CliCommands::Dump { class_name } => dump_class(search_path, class_name),
        CliCommands::Lines { class_name, method } => {
            print_lines(&search_path, class_name, method.as_deref())
        }
        CliCommands::Step {
            class_name,
            method_index,
            offset,
        } => print_stepping(search_path, class_name, *method_index, *offset),
        CliCommands::Ls { package } => {
            list_package(&search_path, package);
            Ok(())
        }
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Load a class directly, for commands that don't need it to be registered
fn load_class(search_path: &SearchPath, class_name: &str) -> Result<ClassFile, String> {
    search_path
        .load_class_file(class_name)
        .map(|data| data.class_file)
        .map_err(|err| format!("Failed to load {}: {}", class_name, err))
}

fn dump_class(search_path: SearchPath, class_name: &str) -> Result<(), String> {
    let mut cache = ClassCache::new(search_path);
    cache.log_load = true;

    // The cache already logged why it couldn't be loaded
    let class = cache
        .find_class(ClassId::new(1), class_name, TypeTag::Class, ClassStatus::default())
        .and_then(|class| class.as_class())
        .ok_or_else(|| format!("Class {} is unavailable", class_name))?;
    let class_file = class.class_file();
    let err_str = |err: ClassFileIndexError| format!("Malformed class {}: {}", class_name, err);

    let (major, minor) = class_file.version();
    println!("Class: {}", class.source_name());
    println!("Source: {}", class.source_path());
    println!("Signature: {}", class.signature());
    println!("Kind: {:?}", class.type_tag());
    println!("Version: {}.{}", major, minor);
    println!("Access: {}", class_file.access_flags().access_string());
    if let Some(super_name) = class_file.super_class_name().map_err(err_str)? {
        println!("Super: {}", super_name);
    }
    for interface in class_file.interface_names().map_err(err_str)? {
        println!("Implements: {}", interface);
    }
    if let Some(source_file) = class_file.source_file().map_err(err_str)? {
        println!("Source file: {}", source_file);
    }

    println!("Fields:");
    for field in class_file.fields() {
        print!(
            "\t{} {} ({})",
            field.type_name().map_err(err_str)?,
            field.name().map_err(err_str)?,
            field.access_string()
        );
        match field.constant_value().map_err(err_str)? {
            Some(value) => println!(" = {}", value),
            None => println!(),
        }
    }

    println!("Methods:");
    for method in class_file.methods() {
        println!(
            "\t#{} {} ({})",
            method.index(),
            method.name().map_err(err_str)?,
            method.access_string()
        );
        println!("\t\t{}", method.signature().map_err(err_str)?);
        let exceptions = method.exceptions().map_err(err_str)?;
        if !exceptions.is_empty() {
            println!("\t\tThrows: {}", exceptions.join(", "));
        }
        for local in method.local_variables().map_err(err_str)? {
            println!(
                "\t\tLocal {}: {} {} (pc {}..{})",
                local.index,
                local.type_name,
                local.name,
                local.start_pc,
                u32::from(local.start_pc) + u32::from(local.length)
            );
        }
    }

    Ok(())
}

fn print_lines(
    search_path: &SearchPath,
    class_name: &str,
    method_name: Option<&str>,
) -> Result<(), String> {
    let class_file = load_class(search_path, class_name)?;
    let err_str = |err: ClassFileIndexError| format!("Malformed class {}: {}", class_name, err);

    for method in class_file.methods() {
        let name = method.name().map_err(err_str)?;
        if method_name.map_or(false, |method_name| method_name != name) {
            continue;
        }

        println!("#{} {}{}", method.index(), name, method.raw_descriptor().map_err(err_str)?);
        let lines = method.breakable_lines();
        if lines.is_empty() {
            println!("\tNo line numbers");
        }
        for (line, offset) in lines {
            println!("\tLine {} @ {}", line, offset);
        }
    }

    Ok(())
}

fn print_stepping(
    search_path: SearchPath,
    class_name: &str,
    method_index: MethodIndex,
    offset: u32,
) -> Result<(), String> {
    let mut cache = ClassCache::new(search_path);
    let class_id = ClassId::new(1);
    cache
        .find_class(class_id, class_name, TypeTag::Class, ClassStatus::default())
        .ok_or_else(|| format!("Class {} is unavailable", class_name))?;

    let info = cache
        .stepping_info(MethodId::unchecked_compose(class_id, method_index), offset)
        .ok_or_else(|| format!("Class {} has no method #{}", class_name, method_index))?;

    let show = |offset: Option<u16>| offset.map_or_else(|| "none".to_owned(), |x| x.to_string());
    println!("Step target: {}", show(info.target));
    println!("Duplicate: {}", show(info.duplicate));
    println!("After duplicate: {}", show(info.after_duplicate));

    Ok(())
}

fn list_package(search_path: &SearchPath, package: &str) {
    // Class files and directories that may be packages
    let children = search_path.children(package, |name| {
        name.ends_with(".class") || !name.contains('.')
    });
    for child in children {
        println!("{}", child.display_path());
    }
}
