// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::{Arg, ArgMatches, Command},
    cydia_packaging::{
        error::CydiaError,
        parser::{ControlDefaults, StanzaParser},
        release::ReleaseManifest,
        repository::{
            find_deb_files, release_from_directory, validate_repository_dir, RELEASE_FILENAME,
        },
    },
    log::{info, warn, LevelFilter},
    serde::Deserialize,
    std::path::Path,
    thiserror::Error,
};

const RELEASE_ABOUT: &str = "\
Generate a Release file for a repository directory.

The directory must contain a `Packages` index and its bzip2 compressed form
`Packages.bz2`. Both are produced by external tools, typically:

   dpkg-scanpackages -m . /dev/null > Packages
   bzip2 -kf Packages

The MD5 digest and size of both files are recorded in the generated Release
file, which is written to `<dir>/Release`.

# YAML Configuration

A YAML file can provide the repository metadata. All keys are optional:

origin (string)
   Name of the repository publisher.

label (string)
   Label of the repository.

suite (string)
   Suite of the repository. Defaults to `beta`.

version (integer)
   Version number of the repository. Defaults to 0.

codename (string)
   Codename of the repository.

architectures (string)
   Supported architectures. Defaults to `iphoneos-arm`.

components (string)
   Repository components. Defaults to `main`.

description (string)
   Free-form description of the repository.

Values given as command line arguments take precedence over YAML values.
";

#[derive(Debug, Error)]
pub enum CrtError {
    #[error("argument parsing error: {0:?}")]
    Clap(#[from] clap::Error),

    #[error("{0}")]
    Cydia(#[from] CydiaError),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0:?}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("invalid sub-command: {0}")]
    InvalidSubCommand(String),
}

pub type Result<T> = std::result::Result<T, CrtError>;

/// Repository metadata for `Release` generation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    pub origin: Option<String>,
    pub label: Option<String>,
    pub suite: Option<String>,
    pub version: Option<i64>,
    pub codename: Option<String>,
    pub architectures: Option<String>,
    pub components: Option<String>,
    pub description: Option<String>,
}

impl ReleaseConfig {
    /// Construct a [ReleaseManifest] with every configured value applied.
    pub fn to_manifest(&self) -> ReleaseManifest {
        let mut manifest = ReleaseManifest::new();

        if let Some(v) = &self.origin {
            manifest.set_origin(v);
        }
        if let Some(v) = &self.label {
            manifest.set_label(v);
        }
        if let Some(v) = &self.suite {
            manifest.set_suite(v);
        }
        if let Some(v) = self.version {
            manifest.set_version(v);
        }
        if let Some(v) = &self.codename {
            manifest.set_codename(v);
        }
        if let Some(v) = &self.architectures {
            manifest.set_architectures(v);
        }
        if let Some(v) = &self.components {
            manifest.set_components(v);
        }
        if let Some(v) = &self.description {
            manifest.set_description(v);
        }

        manifest
    }
}

type StringField = fn(&mut ReleaseConfig) -> &mut Option<String>;

/// String metadata arguments of the `release` command and the config field each sets.
const RELEASE_STRING_ARGS: [(&str, StringField); 7] = [
    ("origin", |c| &mut c.origin),
    ("label", |c| &mut c.label),
    ("suite", |c| &mut c.suite),
    ("codename", |c| &mut c.codename),
    ("architectures", |c| &mut c.architectures),
    ("components", |c| &mut c.components),
    ("description", |c| &mut c.description),
];

fn app() -> Command<'static> {
    let app = Command::new("Cydia Repository Tool")
        .version("0.1")
        .about("Generate and inspect Cydia repository metadata")
        .arg_required_else_help(true);

    let app = app
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times"),
        )
        .arg(
            Arg::new("homepage-default")
                .long("homepage-default")
                .takes_value(true)
                .global(true)
                .help("Value used for packages without a Homepage field"),
        )
        .arg(
            Arg::new("sponsor-default")
                .long("sponsor-default")
                .takes_value(true)
                .global(true)
                .help("Value used for packages without a Sponsor field"),
        );

    let app = app.subcommand(
        Command::new("control")
            .about("Parse a package control file and print its fields")
            .arg(
                Arg::new("path")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path to control file (e.g. output of `dpkg --field`)"),
            ),
    );

    let app = app.subcommand(
        Command::new("packages")
            .about("Parse a Packages index and print a summary of each entry")
            .arg(
                Arg::new("path")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path to Packages file"),
            ),
    );

    let mut release = Command::new("release")
        .about("Generate the Release file of a repository directory")
        .long_about(RELEASE_ABOUT)
        .arg(
            Arg::new("dir")
                .long("dir")
                .takes_value(true)
                .required(true)
                .allow_invalid_utf8(true)
                .help("Repository directory holding Packages and Packages.bz2"),
        )
        .arg(
            Arg::new("yaml-config")
                .long("yaml-config")
                .takes_value(true)
                .allow_invalid_utf8(true)
                .help("Path to a YAML file defining repository metadata"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .takes_value(true)
                .allow_hyphen_values(true)
                .help("Version number of the repository"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Print the Release file instead of writing it"),
        );

    for (name, _) in RELEASE_STRING_ARGS {
        release = release.arg(
            Arg::new(name)
                .long(name)
                .takes_value(true)
                .help("Value of the corresponding Release field"),
        );
    }

    let app = app.subcommand(release);

    app.subcommand(
        Command::new("check-repo")
            .about("Verify a directory holds the files of a repository")
            .arg(
                Arg::new("dir")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Repository directory"),
            ),
    )
}

fn init_logging(matches: &ArgMatches) {
    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();
}

pub fn run_cli() -> Result<()> {
    let mut app = app();
    let matches = app.clone().get_matches();

    init_logging(&matches);

    match matches.subcommand() {
        Some(("control", args)) => command_control(args),
        Some(("packages", args)) => command_packages(args),
        Some(("release", args)) => command_release(args),
        Some(("check-repo", args)) => command_check_repo(args),
        Some((command, _)) => Err(CrtError::InvalidSubCommand(command.to_string())),
        None => {
            app.print_help()?;
            Ok(())
        }
    }
}

fn stanza_parser(args: &ArgMatches) -> StanzaParser {
    let mut defaults = ControlDefaults::default();

    if let Some(v) = args.value_of("homepage-default") {
        defaults = defaults.with_homepage_default(v);
    }
    if let Some(v) = args.value_of("sponsor-default") {
        defaults = defaults.with_sponsor_default(v);
    }

    StanzaParser::new(defaults)
}

fn read_text(args: &ArgMatches) -> Result<String> {
    let path = args
        .value_of_os("path")
        .expect("path argument is required");

    Ok(std::fs::read_to_string(path)?)
}

fn command_control(args: &ArgMatches) -> Result<()> {
    let control = stanza_parser(args).parse_control(&read_text(args)?)?;

    print!("{}", control.to_stanza());

    Ok(())
}

fn command_packages(args: &ArgMatches) -> Result<()> {
    let entries = stanza_parser(args).parse_index(&read_text(args)?)?;

    for entry in &entries {
        println!(
            "{} {} {} ({} bytes)",
            entry.package(),
            entry.version(),
            entry.filename(),
            entry.size()
        );
    }
    info!("{} package(s)", entries.len());

    Ok(())
}

/// Resolve the [ReleaseConfig] from an optional YAML file and argument overrides.
fn release_config(args: &ArgMatches) -> Result<ReleaseConfig> {
    let mut config = if let Some(path) = args.value_of_os("yaml-config") {
        let f = std::fs::File::open(path)?;
        serde_yaml::from_reader(f)?
    } else {
        ReleaseConfig::default()
    };

    if args.is_present("version") {
        config.version = Some(args.value_of_t::<i64>("version")?);
    }

    for (name, field) in RELEASE_STRING_ARGS {
        if let Some(value) = args.value_of(name) {
            *field(&mut config) = Some(value.to_string());
        }
    }

    Ok(config)
}

fn command_release(args: &ArgMatches) -> Result<()> {
    let dir = Path::new(args.value_of_os("dir").expect("dir argument is required"));

    let manifest = release_from_directory(dir, release_config(args)?.to_manifest())?;
    let content = manifest.render();

    if args.is_present("stdout") {
        print!("{}", content);
    } else {
        let path = dir.join(RELEASE_FILENAME);
        std::fs::write(&path, content.as_bytes())?;
        info!("created {}", path.display());
    }

    Ok(())
}

fn command_check_repo(args: &ArgMatches) -> Result<()> {
    let dir = validate_repository_dir(Path::new(
        args.value_of_os("dir").expect("dir argument is required"),
    ))?;

    println!("{} is a valid repository", dir.display());

    match find_deb_files(&dir) {
        Ok(debs) => {
            for deb in debs {
                println!("{}", deb.display());
            }
        }
        Err(CydiaError::RepositoryNoDebFiles(_)) => {
            warn!("no .deb files in {}", dir.display());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
