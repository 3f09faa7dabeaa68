//! Property list documents.
//!
//! A [`Document`] is the client configuration of the Safe Exam Browser: an
//! ordered dictionary of typed values. It is serialized in one canonical XML
//! form so that the config key derived from its bytes is stable.

use std::borrow::Cow;
use std::fmt::Write as _;

use base64::{Engine, engine::general_purpose::STANDARD};
use quick_xml::{
	Reader,
	escape::{partial_escape, unescape},
	events::{BytesText, Event},
	name::QName,
};

use crate::prelude::*;

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
pub const DOCTYPE_HEADER: &str = "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n";

const MAX_DEPTH: usize = 64;

// Value //
//*******//
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Dict(Dict),
	Array(Vec<Value>),
	String(String),
	Bool(bool),
	Integer(i64),
	Real(f64),
	Data(Vec<u8>),
	/// ISO 8601 date, kept verbatim
	Date(String),
}

impl Value {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			Value::Dict(d) => Some(d),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(a) => Some(a),
			_ => None,
		}
	}

	fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Dict(dict) => serde_json::Value::Object(
				dict.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect(),
			),
			Value::Array(items) => {
				serde_json::Value::Array(items.iter().map(Value::to_json).collect())
			}
			Value::String(s) | Value::Date(s) => serde_json::Value::String(s.clone()),
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Integer(i) => serde_json::Value::from(*i),
			Value::Real(r) => serde_json::Number::from_f64(*r)
				.map_or(serde_json::Value::Null, serde_json::Value::Number),
			Value::Data(d) => serde_json::Value::String(STANDARD.encode(d)),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Integer(i)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<Dict> for Value {
	fn from(d: Dict) -> Self {
		Value::Dict(d)
	}
}

impl From<Vec<Value>> for Value {
	fn from(a: Vec<Value>) -> Self {
		Value::Array(a)
	}
}

// Dict //
//******//
/// Dictionary keeping its keys in first insertion order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dict {
	entries: Vec<(String, Value)>,
}

impl Dict {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	/// Inserts a value, overwriting an existing entry in place
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		let key = key.into();
		let value = value.into();
		if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
			entry.1 = value;
		} else {
			self.entries.push((key, value));
		}
	}

	/// Appends a value at the end. An existing entry with the same key is dropped first.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		let key = key.into();
		self.entries.retain(|(k, _)| *k != key);
		self.entries.push((key, value.into()));
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		let pos = self.entries.iter().position(|(k, _)| k == key)?;
		Some(self.entries.remove(pos).1)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}
}

// Document //
//**********//
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
	root: Dict,
}

impl Document {
	/// Empty document
	pub fn new() -> Self {
		Self::default()
	}

	pub fn root(&self) -> &Dict {
		&self.root
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.root.get(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.root.get(key).and_then(Value::as_str)
	}

	/// Sets a root value, keeping the position of an existing key
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.root.insert(key, value);
	}

	/// Appends a value to the end of the root dictionary
	pub fn append_to_root(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.root.append(key, value);
	}

	pub fn delete(&mut self, key: &str) -> Option<Value> {
		self.root.remove(key)
	}

	pub fn to_json(&self) -> serde_json::Value {
		Value::Dict(self.root.clone()).to_json()
	}

	/// Canonical XML text of the document
	pub fn to_xml(&self) -> String {
		let mut out = String::with_capacity(256);
		out.push_str(XML_HEADER);
		out.push_str(DOCTYPE_HEADER);
		out.push_str("<plist version=\"1.0\">");
		write_dict(&mut out, &self.root);
		out.push_str("</plist>\n");
		out
	}

	/// Canonical byte form of the document, the input of the config key
	pub fn serialize(&self) -> Vec<u8> {
		self.to_xml().into_bytes()
	}

	pub fn parse(bytes: &[u8]) -> ClResult<Self> {
		let mut reader = Reader::from_reader(bytes);

		let root = loop {
			match next_event(&mut reader)? {
				Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
				Event::Text(t) if is_blank(&t) => {}
				Event::Start(e) if e.name().as_ref() == b"plist" => {
					break parse_plist_body(&mut reader)?;
				}
				Event::Eof => return Err(malformed("no plist element")),
				_ => return Err(malformed("unexpected content before plist element")),
			}
		};

		loop {
			match next_event(&mut reader)? {
				Event::Eof => break,
				Event::Comment(_) | Event::PI(_) => {}
				Event::Text(t) if is_blank(&t) => {}
				_ => return Err(malformed("unexpected content after plist element")),
			}
		}

		match root {
			Value::Dict(root) => Ok(Self { root }),
			_ => Err(malformed("root value is not a dictionary")),
		}
	}
}

// Serializer
//************
fn write_dict(out: &mut String, dict: &Dict) {
	if dict.is_empty() {
		out.push_str("<dict/>");
		return;
	}
	out.push_str("<dict>");
	for (key, value) in dict.iter() {
		out.push_str("<key>");
		out.push_str(&partial_escape(key));
		out.push_str("</key>");
		write_value(out, value);
	}
	out.push_str("</dict>");
}

fn write_value(out: &mut String, value: &Value) {
	match value {
		Value::Dict(dict) => write_dict(out, dict),
		Value::Array(items) if items.is_empty() => out.push_str("<array/>"),
		Value::Array(items) => {
			out.push_str("<array>");
			for item in items {
				write_value(out, item);
			}
			out.push_str("</array>");
		}
		Value::String(s) => {
			out.push_str("<string>");
			out.push_str(&partial_escape(s));
			out.push_str("</string>");
		}
		Value::Bool(true) => out.push_str("<true/>"),
		Value::Bool(false) => out.push_str("<false/>"),
		Value::Integer(i) => {
			let _ = write!(out, "<integer>{}</integer>", i);
		}
		Value::Real(r) => {
			let _ = write!(out, "<real>{}</real>", r);
		}
		Value::Data(d) => {
			out.push_str("<data>");
			out.push_str(&STANDARD.encode(d));
			out.push_str("</data>");
		}
		Value::Date(d) => {
			out.push_str("<date>");
			out.push_str(&partial_escape(d));
			out.push_str("</date>");
		}
	}
}

// Parser
//********
fn malformed(msg: impl Into<String>) -> Error {
	Error::MalformedDocument(msg.into())
}

fn is_blank(text: &BytesText) -> bool {
	text.iter().all(u8::is_ascii_whitespace)
}

fn next_event<'a>(reader: &mut Reader<&'a [u8]>) -> ClResult<Event<'a>> {
	reader.read_event().map_err(|err| malformed(err.to_string()))
}

/// Reads the content of an element up to its end tag and resolves entities and CDATA sections
fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> ClResult<String> {
	let raw = reader.read_text(QName(end)).map_err(|err| malformed(err.to_string()))?;
	decode_text(&raw)
}

fn decode_text(raw: &str) -> ClResult<String> {
	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(start) = rest.find("<![CDATA[") {
		out.push_str(&unescape_part(&rest[..start])?);
		let cdata = &rest[start + 9..];
		let end = cdata.find("]]>").ok_or_else(|| malformed("unterminated CDATA section"))?;
		out.push_str(&cdata[..end]);
		rest = &cdata[end + 3..];
	}
	out.push_str(&unescape_part(rest)?);
	Ok(out)
}

fn unescape_part(part: &str) -> ClResult<Cow<'_, str>> {
	if part.contains('<') {
		return Err(malformed("unexpected markup inside a text element"));
	}
	unescape(part).map_err(|err| malformed(err.to_string()))
}

fn parse_plist_body(reader: &mut Reader<&[u8]>) -> ClResult<Value> {
	let mut value = None;
	loop {
		match next_event(reader)? {
			Event::End(e) if e.name().as_ref() == b"plist" => break,
			event => {
				if let Some(v) = parse_value_event(reader, event, 0)? {
					if value.is_some() {
						return Err(malformed("plist element holds more than one value"));
					}
					value = Some(v);
				}
			}
		}
	}
	value.ok_or_else(|| malformed("empty plist element"))
}

fn next_value(reader: &mut Reader<&[u8]>, depth: usize) -> ClResult<Value> {
	loop {
		let event = next_event(reader)?;
		if let Some(value) = parse_value_event(reader, event, depth)? {
			return Ok(value);
		}
	}
}

/// Parses the value starting with `event`. Returns `None` for ignorable events.
fn parse_value_event<'a>(
	reader: &mut Reader<&'a [u8]>,
	event: Event<'a>,
	depth: usize,
) -> ClResult<Option<Value>> {
	if depth > MAX_DEPTH {
		return Err(malformed("document nested too deeply"));
	}
	let value = match event {
		Event::Comment(_) | Event::PI(_) => return Ok(None),
		Event::Text(t) if is_blank(&t) => return Ok(None),
		Event::Empty(e) => match e.name().as_ref() {
			b"dict" => Value::Dict(Dict::new()),
			b"array" => Value::Array(Vec::new()),
			b"string" => Value::String(String::new()),
			b"true" => Value::Bool(true),
			b"false" => Value::Bool(false),
			b"data" => Value::Data(Vec::new()),
			name => return Err(unexpected_element(name)),
		},
		Event::Start(e) => match e.name().as_ref() {
			b"dict" => Value::Dict(parse_dict(reader, depth + 1)?),
			b"array" => Value::Array(parse_array(reader, depth + 1)?),
			b"string" => Value::String(read_text(reader, b"string")?),
			b"integer" => {
				let text = read_text(reader, b"integer")?;
				Value::Integer(
					text.trim()
						.parse()
						.map_err(|_| malformed(format!("invalid integer: {}", text)))?,
				)
			}
			b"real" => {
				let text = read_text(reader, b"real")?;
				Value::Real(
					text.trim().parse().map_err(|_| malformed(format!("invalid real: {}", text)))?,
				)
			}
			b"true" => {
				read_text(reader, b"true")?;
				Value::Bool(true)
			}
			b"false" => {
				read_text(reader, b"false")?;
				Value::Bool(false)
			}
			b"data" => {
				let text = read_text(reader, b"data")?;
				let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
				Value::Data(STANDARD.decode(compact).map_err(|_| malformed("invalid data"))?)
			}
			b"date" => Value::Date(read_text(reader, b"date")?.trim().to_string()),
			name => return Err(unexpected_element(name)),
		},
		Event::Eof => return Err(malformed("unexpected end of document")),
		_ => return Err(malformed("unexpected content, expected a value")),
	};
	Ok(Some(value))
}

fn unexpected_element(name: &[u8]) -> Error {
	malformed(format!("unexpected element <{}>", String::from_utf8_lossy(name)))
}

fn parse_dict(reader: &mut Reader<&[u8]>, depth: usize) -> ClResult<Dict> {
	let mut dict = Dict::new();
	loop {
		let key = match next_event(reader)? {
			Event::End(e) if e.name().as_ref() == b"dict" => return Ok(dict),
			Event::Start(e) if e.name().as_ref() == b"key" => read_text(reader, b"key")?,
			Event::Empty(e) if e.name().as_ref() == b"key" => String::new(),
			Event::Comment(_) | Event::PI(_) => continue,
			Event::Text(t) if is_blank(&t) => continue,
			Event::Eof => return Err(malformed("unexpected end of document")),
			_ => return Err(malformed("expected <key> in dictionary")),
		};
		let value = next_value(reader, depth)?;
		dict.insert(key, value);
	}
}

fn parse_array(reader: &mut Reader<&[u8]>, depth: usize) -> ClResult<Vec<Value>> {
	let mut items = Vec::new();
	loop {
		match next_event(reader)? {
			Event::End(e) if e.name().as_ref() == b"array" => return Ok(items),
			event => {
				if let Some(value) = parse_value_event(reader, event, depth)? {
					items.push(value);
				}
			}
		}
	}
}


// vim: ts=4
