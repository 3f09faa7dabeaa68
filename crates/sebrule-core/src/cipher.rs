//! Safe Exam Browser configuration file codec.
//!
//! Config files are either plain XML documents or containers:
//! an optional gzip layer around a 4 byte prefix and a payload.
//!
//! - `plnd`: the payload is a gzipped document
//! - `pswd`, `pwcc`: the payload is an RNCryptor v3 password container
//!   (`03 01 | enc salt[8] | hmac salt[8] | iv[16] | ciphertext | hmac[32]`),
//!   keys derived with PBKDF2-HMAC-SHA1 (10000 rounds), AES-256-CBC with PKCS#7
//!   padding, HMAC-SHA256 over everything before the tag. The plaintext is
//!   usually gzipped again.
//!
//! Public key containers are not supported.

use std::borrow::Cow;
use std::io::{Read, Write};

use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha1::Sha1;
use sha2::Sha256;

use crate::plist::Document;
use crate::prelude::*;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Message of every rejected upload. The cause is only logged.
pub const INVALID_CONFIG_FILE: &str = "not a valid configuration file";

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const PREFIX_PLAIN: &[u8] = b"plnd";
const PREFIX_PASSWORD: &[u8] = b"pswd";
const PREFIX_PASSWORD_CONFIGURE_CLIENT: &[u8] = b"pwcc";

const RNCRYPTOR_VERSION: u8 = 3;
const RNCRYPTOR_OPTIONS_PASSWORD: u8 = 1;
const PBKDF2_ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 8;
const IV_LEN: usize = 16;
const HEADER_LEN: usize = 2 + SALT_LEN + SALT_LEN + IV_LEN;
const HMAC_LEN: usize = 32;

const MAX_DOCUMENT_LEN: usize = 16 * 1024 * 1024;

fn is_plaintext(data: &[u8]) -> bool {
	data.starts_with(b"<?xml")
}

fn gunzip(data: &[u8]) -> ClResult<Vec<u8>> {
	let mut out = Vec::new();
	GzDecoder::new(data)
		.take(MAX_DOCUMENT_LEN as u64 + 1)
		.read_to_end(&mut out)
		.map_err(|err| {
			debug!("gunzip failed: {}", err);
			Error::DecryptionFailed
		})?;
	if out.len() > MAX_DOCUMENT_LEN {
		debug!("decompressed document too large");
		return Err(Error::DecryptionFailed);
	}
	Ok(out)
}

fn gunzip_if_compressed(data: Vec<u8>) -> ClResult<Vec<u8>> {
	if data.starts_with(GZIP_MAGIC) { gunzip(&data) } else { Ok(data) }
}

fn gzip(data: &[u8]) -> ClResult<Vec<u8>> {
	let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data)?;
	Ok(encoder.finish()?)
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
	let mut key = [0u8; 32];
	pbkdf2::pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
	key
}

fn rncryptor_decrypt(payload: &[u8], password: &str) -> ClResult<Vec<u8>> {
	if payload.len() < HEADER_LEN + HMAC_LEN
		|| payload[0] != RNCRYPTOR_VERSION
		|| payload[1] != RNCRYPTOR_OPTIONS_PASSWORD
	{
		debug!("not an RNCryptor v3 password container");
		return Err(Error::DecryptionFailed);
	}
	let (message, tag) = payload.split_at(payload.len() - HMAC_LEN);
	let enc_salt = &message[2..2 + SALT_LEN];
	let hmac_salt = &message[2 + SALT_LEN..2 + 2 * SALT_LEN];
	let iv = &message[2 + 2 * SALT_LEN..HEADER_LEN];
	let ciphertext = &message[HEADER_LEN..];

	let hmac_key = derive_key(password, hmac_salt);
	let mut mac = HmacSha256::new_from_slice(&hmac_key).map_err(|_| Error::DecryptionFailed)?;
	mac.update(message);
	mac.verify_slice(tag).map_err(|_| {
		debug!("config file HMAC mismatch");
		Error::DecryptionFailed
	})?;

	let enc_key = derive_key(password, enc_salt);
	Aes256CbcDec::new_from_slices(&enc_key, iv)
		.map_err(|_| Error::DecryptionFailed)?
		.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
		.map_err(|_| {
			debug!("config file padding error");
			Error::DecryptionFailed
		})
}

/// Returns the plaintext document of a config file.
///
/// Plain XML input is returned unchanged whatever the password is.
pub fn decrypt(data: &[u8], password: &str) -> ClResult<Vec<u8>> {
	if is_plaintext(data) {
		return Ok(data.to_vec());
	}

	let data: Cow<'_, [u8]> =
		if data.starts_with(GZIP_MAGIC) { Cow::Owned(gunzip(data)?) } else { Cow::Borrowed(data) };
	if is_plaintext(&data) {
		return Ok(data.into_owned());
	}
	if data.len() < 4 {
		return Err(Error::DecryptionFailed);
	}

	let (prefix, payload) = data.split_at(4);
	match prefix {
		PREFIX_PLAIN => gunzip(payload),
		PREFIX_PASSWORD | PREFIX_PASSWORD_CONFIGURE_CLIENT => {
			if password.is_empty() {
				debug!("encrypted config file without password");
				return Err(Error::DecryptionFailed);
			}
			gunzip_if_compressed(rncryptor_decrypt(payload, password)?)
		}
		_ => {
			debug!("unsupported config file prefix: {:?}", String::from_utf8_lossy(prefix));
			Err(Error::DecryptionFailed)
		}
	}
}

/// Encrypts a document into a gzipped `pswd` container
pub fn encrypt(document: &[u8], password: &str) -> ClResult<Vec<u8>> {
	let mut rng = rand::rng();
	let enc_salt: [u8; SALT_LEN] = rng.random();
	let hmac_salt: [u8; SALT_LEN] = rng.random();
	let iv: [u8; IV_LEN] = rng.random();
	encrypt_with(document, password, &enc_salt, &hmac_salt, &iv)
}

fn encrypt_with(
	document: &[u8],
	password: &str,
	enc_salt: &[u8; SALT_LEN],
	hmac_salt: &[u8; SALT_LEN],
	iv: &[u8; IV_LEN],
) -> ClResult<Vec<u8>> {
	if password.is_empty() {
		return Err(Error::ValidationError("a password is required for encryption".into()));
	}
	let enc_key = derive_key(password, enc_salt);
	let hmac_key = derive_key(password, hmac_salt);

	let ciphertext = Aes256CbcEnc::new_from_slices(&enc_key, iv)
		.map_err(|_| Error::Internal("invalid cipher key length".into()))?
		.encrypt_padded_vec_mut::<Pkcs7>(&gzip(document)?);

	let mut container = Vec::with_capacity(4 + HEADER_LEN + ciphertext.len() + HMAC_LEN);
	container.extend_from_slice(PREFIX_PASSWORD);
	container.extend_from_slice(&[RNCRYPTOR_VERSION, RNCRYPTOR_OPTIONS_PASSWORD]);
	container.extend_from_slice(enc_salt);
	container.extend_from_slice(hmac_salt);
	container.extend_from_slice(iv);
	container.extend_from_slice(&ciphertext);

	let mut mac = HmacSha256::new_from_slice(&hmac_key)
		.map_err(|_| Error::Internal("invalid HMAC key length".into()))?;
	mac.update(&container[4..]);
	container.extend_from_slice(&mac.finalize().into_bytes());

	gzip(&container)
}

/// Structural sniff: the first line is an XML declaration, the second a plist doctype
pub fn looks_like_document(data: &[u8]) -> bool {
	let mut lines = data.split(|&b| b == b'\n');
	matches!(
		(lines.next(), lines.next()),
		(Some(first), Some(second))
			if first.starts_with(b"<?xml") && second.starts_with(b"<!DOCTYPE plist")
	)
}

/// Validates an uploaded config file and returns its plaintext document.
///
/// Every failure is reported with the same message, so the response tells
/// nothing about the password or the file structure.
pub fn validate_upload(data: &[u8], password: &str) -> ClResult<Vec<u8>> {
	let invalid = || Error::ValidationError(INVALID_CONFIG_FILE.into());

	let plain = decrypt(data, password).map_err(|err| {
		info!("Config file upload rejected: {}", err);
		invalid()
	})?;
	if !looks_like_document(&plain) {
		info!("Config file upload rejected: missing XML or plist header");
		return Err(invalid());
	}
	Document::parse(&plain).map_err(|err| {
		info!("Config file upload rejected: {}", err);
		invalid()
	})?;
	Ok(plain)
}


// vim: ts=4
