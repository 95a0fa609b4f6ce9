mod prompt;

use std::io::{self, BufReader, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mkqr::batch::{self, BatchOptions};
use mkqr::config::{self, Config};
use mkqr::content::{self, ContentKind};
use mkqr::encoder::{
    self, Email, Encode, Geo, Otp, OtpAlgorithm, OtpKind, Phone, Sms, VCard, Wifi, WifiEncryption,
};
use mkqr::qr::{EcLevel, Generator, Options};
use mkqr::render;

use crate::prompt::prompt_password_hidden;

const LOG_ENV: &str = "MKQR_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "mkqr",
    version,
    about = "Generate QR codes from various data types",
    long_about = "Generate QR codes for text, URLs, WiFi, contacts, OTP and more.\n\
                  Output goes to the terminal, a PNG file, or base64.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Content to encode; read from stdin when omitted
    content: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Output file (PNG format)
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    /// QR code size in pixels
    #[arg(long, global = true)]
    size: Option<u32>,

    /// Error correction level (L/M/Q/H)
    #[arg(short = 'l', long, global = true)]
    level: Option<EcLevel>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show status output even if the config sets quiet
    #[arg(long, global = true, overrides_with = "quiet")]
    no_quiet: bool,

    /// Invert colors (for light terminals)
    #[arg(long, global = true)]
    invert: bool,

    /// Normal colors even if the config sets invert
    #[arg(long, global = true, overrides_with = "invert")]
    no_invert: bool,

    /// Use compact display mode
    #[arg(long, global = true)]
    small: bool,

    /// Full-size display even if the config sets small
    #[arg(long, global = true, overrides_with = "small")]
    no_small: bool,

    /// Print the PNG as base64 instead of drawing it
    #[arg(long, global = true, conflicts_with = "output")]
    base64: bool,

    /// Debug logging (overridden by MKQR_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// QR code for a URL (https:// is added when missing)
    ///
    /// Examples:
    ///   mkqr url https://github.com
    ///   mkqr url github.com
    Url { url: String },

    /// QR code for plain text, without format detection
    Text { content: String },

    /// QR code that dials a phone number
    Phone { number: String },

    /// QR code that opens the SMS app
    ///
    /// Examples:
    ///   mkqr sms +1234567890 -b "Hello!"
    Sms {
        number: String,
        /// Message body
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// QR code that opens an email composer
    ///
    /// Examples:
    ///   mkqr email hello@example.com -s "Subject" -b "Message body"
    Email {
        address: String,
        /// Email subject
        #[arg(short, long, default_value = "")]
        subject: String,
        /// Email body
        #[arg(short, long, default_value = "")]
        body: String,
        /// CC recipients
        #[arg(long, default_value = "")]
        cc: String,
        /// BCC recipients
        #[arg(long, default_value = "")]
        bcc: String,
    },

    /// QR code for a geographic location
    ///
    /// Examples:
    ///   mkqr geo --lat 40.7128 --lng -74.0060
    ///   mkqr geo --lat 39.9042 --lng 116.4074 --query "Beijing"
    Geo {
        /// Latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Location name/query
        #[arg(long, default_value = "")]
        query: String,
    },

    /// QR code for joining a WiFi network
    ///
    /// Examples:
    ///   mkqr wifi -s "MyNetwork" -p "password123"
    ///   mkqr wifi -s "Guest" -e nopass
    Wifi {
        /// Network name (SSID)
        #[arg(short, long)]
        ssid: String,
        /// Network password
        #[arg(short, long, default_value = "")]
        password: String,
        /// Encryption type (WPA/WEP/nopass)
        #[arg(short, long)]
        encryption: Option<WifiEncryption>,
        /// Hidden network
        #[arg(short = 'H', long)]
        hidden: bool,
    },

    /// QR code for a contact (vCard)
    Vcard(VcardArgs),

    /// QR code for a 2FA authenticator (otpauth://)
    ///
    /// Examples:
    ///   mkqr otp -s JBSWY3DPEHPK3PXP -i GitHub -a user@example.com
    ///   mkqr otp -i AWS -a me --digits 8 --period 60   (prompts for the secret)
    Otp(OtpArgs),

    /// One PNG per line of a file ("-" for stdin)
    ///
    /// Empty lines and lines starting with # are skipped.
    Batch {
        file: String,
        /// Output directory
        #[arg(short = 'O', long, default_value = ".")]
        output_dir: PathBuf,
        /// Filename prefix
        #[arg(long, default_value = batch::DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Args, Debug)]
struct VcardArgs {
    /// First name
    #[arg(short, long = "first", default_value = "")]
    first: String,
    /// Last name
    #[arg(long = "last", default_value = "")]
    last: String,
    /// Organization
    #[arg(short = 'O', long, default_value = "")]
    org: String,
    /// Job title
    #[arg(short, long, default_value = "")]
    title: String,
    /// Phone number
    #[arg(short, long, default_value = "")]
    phone: String,
    /// Work phone
    #[arg(long, default_value = "")]
    work_phone: String,
    /// Mobile phone
    #[arg(short, long, default_value = "")]
    mobile: String,
    /// Email address
    #[arg(short, long, default_value = "")]
    email: String,
    /// Work email address
    #[arg(long, default_value = "")]
    work_email: String,
    /// Website URL
    #[arg(short, long, default_value = "")]
    website: String,
    /// Address
    #[arg(short, long, default_value = "")]
    address: String,
    /// Note
    #[arg(short, long, default_value = "")]
    note: String,
}

#[derive(Args, Debug)]
struct OtpArgs {
    /// Secret key (base32); prompted for when omitted
    #[arg(short, long)]
    secret: Option<String>,
    /// Service/issuer name
    #[arg(short, long)]
    issuer: String,
    /// Account name/email
    #[arg(short, long)]
    account: String,
    /// Hash algorithm (SHA1/SHA256/SHA512)
    #[arg(long, default_value = "SHA1")]
    algorithm: OtpAlgorithm,
    /// Number of digits (6 or 8)
    #[arg(long, default_value_t = 6)]
    digits: u8,
    /// Time period in seconds (TOTP)
    #[arg(long, default_value_t = 30)]
    period: u32,
    /// Initial counter value (HOTP)
    #[arg(long, default_value_t = 0)]
    counter: u64,
    /// Use HOTP (counter-based) instead of TOTP
    #[arg(long)]
    hotp: bool,
    /// Print the code the authenticator should show
    #[arg(long)]
    show_code: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective config
    Show,
    /// Write a default config file
    Init,
    /// Print the config file location
    Path,
}

/// Where and how a generated symbol is written.
struct Output {
    file: Option<PathBuf>,
    base64: bool,
    level: EcLevel,
    size: u32,
    invert: bool,
    small: bool,
    quiet: bool,
}

impl Output {
    fn resolve(args: &GlobalArgs, cfg: &Config) -> anyhow::Result<Self> {
        let size = args.size.unwrap_or(cfg.size);
        if size == 0 {
            bail!("size must be a positive number, got {size}");
        }
        Ok(Self {
            file: args.output.clone(),
            base64: args.base64,
            level: args.level.unwrap_or(cfg.level),
            size,
            invert: flag(args.invert, args.no_invert, cfg.invert),
            small: flag(args.small, args.no_small, cfg.small),
            quiet: flag(args.quiet, args.no_quiet, cfg.quiet),
        })
    }

    /// Status line on stderr, so stdout stays clean for the code itself.
    fn status(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", msg.as_ref());
        }
    }
}

/// `--x` forces on, `--no-x` forces off, otherwise the config decides.
fn flag(on: bool, off: bool, cfg: bool) -> bool {
    if off { false } else { on || cfg }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Some(Commands::Config { cmd }) = &cli.command {
        return cmd_config(cmd);
    }

    let cfg = Config::load()?;
    let out = Output::resolve(&cli.global, &cfg)?;

    match cli.command {
        None => cmd_root(&out, cli.content)?,
        Some(Commands::Url { url }) => cmd_url(&out, &url)?,
        Some(Commands::Text { content }) => cmd_text(&out, &content)?,
        Some(Commands::Phone { number }) => {
            out.status(format!("Phone: {number}"));
            generate(&out, &Phone { number }.encode())?
        }
        Some(Commands::Sms { number, body }) => {
            out.status(format!("SMS: {number}"));
            generate(&out, &Sms { number, body }.encode())?
        }
        Some(Commands::Email {
            address,
            subject,
            body,
            cc,
            bcc,
        }) => {
            out.status(format!("Email: {address}"));
            let email = Email {
                to: address,
                cc,
                bcc,
                subject,
                body,
            };
            generate(&out, &email.encode())?
        }
        Some(Commands::Geo { lat, lng, query }) => {
            if query.is_empty() {
                out.status(format!("Location: {lat:.4}, {lng:.4}"));
            } else {
                out.status(format!("Location: {query} ({lat:.4}, {lng:.4})"));
            }
            let geo = Geo {
                latitude: lat,
                longitude: lng,
                query,
            };
            generate(&out, &geo.encode())?
        }
        Some(Commands::Wifi {
            ssid,
            password,
            encryption,
            hidden,
        }) => {
            let wifi = Wifi {
                ssid,
                password,
                encryption,
                hidden,
            };
            out.status(format!("WiFi: {} ({})", wifi.ssid, wifi.resolved_encryption()));
            generate(&out, &wifi.encode())?
        }
        Some(Commands::Vcard(args)) => cmd_vcard(&out, args)?,
        Some(Commands::Otp(args)) => cmd_otp(&out, args)?,
        Some(Commands::Batch {
            file,
            output_dir,
            prefix,
        }) => cmd_batch(&out, &file, output_dir, prefix)?,
        Some(Commands::Config { .. }) => unreachable!("handled before config load"),
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

/// Encode `content` and write it wherever `out` says.
fn generate(out: &Output, content: &str) -> anyhow::Result<()> {
    let generator = Generator::new(Options {
        level: out.level,
        size: out.size,
    });
    let symbol = generator.generate(content)?;

    if let Some(path) = &out.file {
        symbol
            .save_png(path, out.size)
            .with_context(|| format!("failed to write PNG file {}", path.display()))?;
        out.status(format!("Saved to: {}", path.display()));
    } else if out.base64 {
        println!("{}", symbol.to_base64(out.size)?);
    } else {
        print!("{}", render::render(&symbol.bitmap(), out.invert, out.small));
    }
    Ok(())
}

/// Up to `max` characters of `s`, with an ellipsis when cut.
fn preview(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// mkqr [content]
fn cmd_root(out: &Output, content: Option<String>) -> anyhow::Result<()> {
    let content = match content {
        Some(c) => c,
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                Cli::command().print_help()?;
                return Ok(());
            }
            let mut data = String::new();
            stdin
                .lock()
                .read_to_string(&mut data)
                .context("failed to read from stdin")?;
            data
        }
    };

    let content = content.trim();
    if content.is_empty() {
        bail!("no content provided");
    }

    let (kind, description) = content::detect_and_describe(content);
    out.status(format!("Detected: {description}"));

    generate(out, &content::normalize(content, kind))
}

/// mkqr url URL
fn cmd_url(out: &Output, url: &str) -> anyhow::Result<()> {
    let url = content::normalize(url, ContentKind::Url);
    out.status(format!("URL: {url}"));
    generate(out, &url)
}

/// mkqr text CONTENT
fn cmd_text(out: &Output, content: &str) -> anyhow::Result<()> {
    out.status(format!("Text: {}", preview(content, 50)));
    generate(out, content)
}

/// mkqr vcard ...
fn cmd_vcard(out: &Output, args: VcardArgs) -> anyhow::Result<()> {
    if args.first.is_empty() && args.last.is_empty() && args.phone.is_empty() && args.email.is_empty() {
        bail!("at least one of --first, --last, --phone, or --email is required");
    }

    let card = VCard {
        first_name: args.first,
        last_name: args.last,
        organization: args.org,
        title: args.title,
        phone: args.phone,
        phone_work: args.work_phone,
        phone_mobile: args.mobile,
        email: args.email,
        email_work: args.work_email,
        website: args.website,
        address: args.address,
        note: args.note,
    };

    let name = card.full_name();
    if !name.is_empty() {
        out.status(format!("Contact: {name}"));
    }
    generate(out, &card.encode())
}

/// mkqr otp ...
fn cmd_otp(out: &Output, args: OtpArgs) -> anyhow::Result<()> {
    let secret = match &args.secret {
        Some(s) => s.clone(),
        None => prompt_password_hidden("OTP secret (base32): ")?,
    };

    let otp = otp_from_args(&args, &secret);
    otp.validate().context("invalid OTP settings")?;

    out.status(format!("OTP: {} ({})", otp.issuer, otp.account));
    if args.show_code {
        let code = encoder::current_code(&otp)?;
        eprintln!("Current code: {code}");
    }

    generate(out, &otp.encode())
}

/// Build the payload, keeping the secret without the spaces and hyphens it was pasted with.
fn otp_from_args(args: &OtpArgs, secret: &str) -> Otp {
    Otp {
        kind: if args.hotp { OtpKind::Hotp } else { OtpKind::Totp },
        secret: encoder::clean_secret(secret),
        issuer: args.issuer.clone(),
        account: args.account.clone(),
        algorithm: Some(args.algorithm),
        digits: Some(args.digits),
        period: Some(args.period),
        counter: Some(args.counter),
    }
}

/// mkqr batch FILE
fn cmd_batch(out: &Output, file: &str, output_dir: PathBuf, prefix: String) -> anyhow::Result<()> {
    let opts = BatchOptions {
        output_dir,
        prefix,
        size: out.size,
        level: out.level,
    };

    let report = if file == "-" {
        batch::run(io::stdin().lock(), &opts)?
    } else {
        let f = std::fs::File::open(file).with_context(|| format!("failed to open input file {file}"))?;
        batch::run(BufReader::new(f), &opts)?
    };

    for failure in &report.failures {
        eprintln!("Error on line {}: {}", failure.line, failure.error);
    }
    for (i, item) in report.generated.iter().enumerate() {
        out.status(format!("[{}] line {} ({}) -> {}", i + 1, item.line, item.kind, item.path.display()));
    }
    out.status(format!(
        "\nGenerated {} QR codes in {}",
        report.generated.len(),
        opts.output_dir.display()
    ));
    Ok(())
}

/// mkqr config show|init|path
fn cmd_config(cmd: &ConfigCommands) -> anyhow::Result<()> {
    let path = config::config_path()?;
    match cmd {
        ConfigCommands::Show => {
            let cfg = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigCommands::Init => {
            if path.exists() {
                println!("Config already exists at: {}", path.display());
                return Ok(());
            }
            config::save_config(&Config::default(), &path)?;
            println!("Initialized config at {}", path.display());
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
