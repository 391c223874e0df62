//! Command-line parsing.
//!
//! Flags are single-dash and case-sensitive. Anything not starting with `-` is a
//! positional argument: `<PDF-file> [<output-file>]`. A `--` argument ends flag
//! parsing.

use crate::config::{
    DocumentPasswords, SigConfig, SigningSettings, StoreSettings, ValidationOptions,
};
use crate::error::{Error, Result};
use crate::request::{Mode, OperationRequest};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Program name used in the usage text.
pub const PROGRAM: &str = "pdfsig";

/// Copyright line printed with the version.
pub const COPYRIGHT: &str = "Copyright 2015-2024 The pdfsig authors";

/// Flag table: name, argument placeholder, description.
const FLAGS: &[(&str, &str, &str)] = &[
    ("-nssdir", "<string>", "path to directory of libnss3 database"),
    ("-nss-pwd", "<string>", "password to access the NSS database (if any)"),
    ("-nocert", "", "don't perform certificate validation"),
    ("-no-ocsp", "", "don't perform online OCSP certificate revocation check"),
    ("-aia", "", "use Authority Information Access (AIA) extension for certificate fetching"),
    ("-dump", "", "dump all signatures into current directory"),
    ("-add-signature", "", "adds a new signature to the document"),
    (
        "-new-signature-field-name",
        "<string>",
        "field name used for the newly added signature. A random ID will be used if empty",
    ),
    ("-sign", "<int>", "sign the document in the signature field with the given number"),
    (
        "-etsi",
        "",
        "create a signature of type ETSI.CAdES.detached instead of adbe.pkcs7.detached",
    ),
    ("-nick", "<string>", "use the certificate with the given nickname for signing"),
    (
        "-kpw",
        "<string>",
        "password for the signing key (might be missing if the key isn't password protected)",
    ),
    ("-digest", "<string>", "name of the digest algorithm (default: SHA256)"),
    ("-reason", "<string>", "reason for signing (default: no reason given)"),
    ("-list-nicks", "", "list available nicknames in the NSS database"),
    ("-opw", "<string>", "owner password (for encrypted files)"),
    ("-upw", "<string>", "user password (for encrypted files)"),
    ("-v", "", "print copyright and version info"),
    ("-h", "", "print usage information"),
    ("-help", "", "print usage information"),
    ("-?", "", "print usage information"),
];

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit successfully
    Help,
    /// Print version and exit successfully
    Version,
    /// Run an operation
    Run(OperationRequest),
}

/// Flag values as given, before classification.
#[derive(Debug, Default)]
struct RawArgs {
    nss_dir: Option<PathBuf>,
    nss_password: Option<String>,
    no_cert: bool,
    no_ocsp: bool,
    aia: bool,
    dump: bool,
    add_signature: bool,
    new_field_name: Option<String>,
    sign: i64,
    etsi: bool,
    nick: Option<String>,
    key_password: Option<String>,
    digest: Option<String>,
    reason: Option<String>,
    list_nicks: bool,
    owner_password: Option<String>,
    user_password: Option<String>,
    version: bool,
    help: bool,
    positionals: Vec<String>,
}

/// Parse the arguments that follow the program name.
pub fn parse_args<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let raw = scan_flags(&args)?;
    classify(raw)
}

fn scan_flags(args: &[String]) -> Result<RawArgs> {
    let mut raw = RawArgs::default();
    let mut flags_done = false;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if flags_done || !arg.starts_with('-') || arg == "-" {
            raw.positionals.push(arg.to_string());
            i += 1;
            continue;
        }
        match arg {
            "--" => flags_done = true,
            "-nssdir" => raw.nss_dir = Some(PathBuf::from(value(args, &mut i)?)),
            "-nss-pwd" => raw.nss_password = Some(value(args, &mut i)?),
            "-nocert" => raw.no_cert = true,
            "-no-ocsp" => raw.no_ocsp = true,
            "-aia" => raw.aia = true,
            "-dump" => raw.dump = true,
            "-add-signature" => raw.add_signature = true,
            "-new-signature-field-name" => raw.new_field_name = Some(value(args, &mut i)?),
            "-sign" => {
                let number = value(args, &mut i)?;
                raw.sign = number.trim().parse().map_err(|_| {
                    Error::Usage(format!("Invalid number '{}' for -sign", number))
                })?;
            },
            "-etsi" => raw.etsi = true,
            "-nick" => raw.nick = Some(value(args, &mut i)?),
            "-kpw" => raw.key_password = Some(value(args, &mut i)?),
            "-digest" => raw.digest = Some(value(args, &mut i)?),
            "-reason" => raw.reason = Some(value(args, &mut i)?),
            "-list-nicks" => raw.list_nicks = true,
            "-opw" => raw.owner_password = Some(value(args, &mut i)?),
            "-upw" => raw.user_password = Some(value(args, &mut i)?),
            "-v" => raw.version = true,
            "-h" | "-help" | "-?" => raw.help = true,
            _ => return Err(Error::Usage(format!("Unknown option: {}", arg))),
        }
        i += 1;
    }

    Ok(raw)
}

/// Take the value following the flag at `args[*i]`.
fn value(args: &[String], i: &mut usize) -> Result<String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| Error::Usage(format!("Option {} requires an argument", flag)))
}

fn classify(raw: RawArgs) -> Result<Invocation> {
    if raw.version {
        return Ok(Invocation::Version);
    }
    if raw.help {
        return Ok(Invocation::Help);
    }

    let config = build_config(&raw);
    if raw.list_nicks {
        return Ok(Invocation::Run(OperationRequest::new(Mode::ListIdentities, config)));
    }

    let mut positionals = raw.positionals.into_iter().map(PathBuf::from);
    let document = positionals
        .next()
        .ok_or_else(|| Error::Usage("No PDF file given".to_string()))?;
    let output = positionals.next();
    let extra = positionals.count();

    // -sign 0 (or below) means no field is being signed
    let field_number = usize::try_from(raw.sign).ok().and_then(NonZeroUsize::new);
    if raw.add_signature && field_number.is_some() {
        return Err(Error::Usage("-add-signature and -sign cannot be used together".to_string()));
    }

    let mode = if raw.add_signature {
        Mode::SignNew {
            document,
            output: output.ok_or(Error::MissingOutputPath)?,
        }
    } else if let Some(field_number) = field_number {
        Mode::SignExisting {
            document,
            output: output.ok_or(Error::MissingOutputPath)?,
            field_number,
        }
    } else if output.is_some() || extra > 0 {
        return Err(Error::Usage(
            "An output file is only accepted when signing".to_string(),
        ));
    } else if raw.dump {
        Mode::Dump { document }
    } else {
        Mode::Report { document }
    };

    Ok(Invocation::Run(OperationRequest::new(mode, config)))
}

fn build_config(raw: &RawArgs) -> SigConfig {
    let mut signing = SigningSettings {
        nickname: raw.nick.clone().unwrap_or_default(),
        key_password: raw.key_password.clone().unwrap_or_default(),
        reason: raw.reason.clone().unwrap_or_default(),
        cades: raw.etsi,
        new_field_name: raw.new_field_name.clone().filter(|name| !name.is_empty()),
        ..SigningSettings::default()
    };
    if let Some(digest) = &raw.digest {
        signing.digest = digest.clone();
    }

    SigConfig::new()
        .with_store(StoreSettings {
            directory: raw.nss_dir.clone(),
            password: raw.nss_password.clone(),
        })
        .with_document(DocumentPasswords {
            owner: raw.owner_password.clone(),
            user: raw.user_password.clone(),
        })
        .with_validation(ValidationOptions {
            verify_certificate: !raw.no_cert,
            check_ocsp: !raw.no_ocsp,
            use_aia: raw.aia,
        })
        .with_signing(signing)
}

/// Version banner.
pub fn version_text() -> String {
    format!("{} version {}\n{}\n", PROGRAM, env!("CARGO_PKG_VERSION"), COPYRIGHT)
}

/// Version banner followed by the usage text.
pub fn usage_text() -> String {
    let mut text = version_text();
    text.push_str(&format!("Usage: {} [options] <PDF-file> [<output-file>]\n", PROGRAM));
    let width = FLAGS
        .iter()
        .map(|(flag, arg, _)| flag.len() + arg.len() + 1)
        .max()
        .unwrap_or(0);
    for (flag, arg, help) in FLAGS {
        let synopsis = if arg.is_empty() {
            flag.to_string()
        } else {
            format!("{} {}", flag, arg)
        };
        text.push_str(&format!("  {:width$}: {}\n", synopsis, help, width = width + 1));
    }
    text
}
