
use std::collections::HashMap;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Recursion guard for expression nesting. The script comes from a foreign
// process and may encode arbitrarily deep or corrupt nesting.
const MAX_PARSE_DEPTH: u32 = 64;

// Emission cap per script body, guards against runaway streams.
const MAX_STATEMENTS: usize = 2000;

#[derive(Debug, Error)]
pub enum BpdecError {
    #[error("no symbol registered for 0x{0:X}")]
    UnknownSymbol(u64),

    #[error("symbol map line {0}: missing name")]
    MissingSymbolName(usize),

    #[error("symbol map line {0}: invalid address: {1}")]
    InvalidSymbolAddress(usize, String),
}

/// Blueprint VM opcodes (`EExprToken` in the engine's Script.h).
/// The discriminants are sparse; a byte outside this set is a valid
/// "unknown opcode" outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExprToken {
    LocalVariable = 0x00,
    InstanceVariable = 0x01,
    DefaultVariable = 0x02,
    Return = 0x04,
    Jump = 0x06,
    JumpIfNot = 0x07,
    Assert = 0x09,
    Nothing = 0x0B,
    Let = 0x0F,
    ClassContext = 0x12,
    MetaCast = 0x13,
    LetBool = 0x14,
    EndParmValue = 0x15,
    EndFunctionParms = 0x16,
    SelfRef = 0x17,
    Skip = 0x18,
    Context = 0x19,
    ContextFailSilent = 0x1A,
    VirtualFunction = 0x1B,
    FinalFunction = 0x1C,
    IntConst = 0x1D,
    FloatConst = 0x1E,
    StringConst = 0x1F,
    ObjectConst = 0x20,
    NameConst = 0x21,
    RotationConst = 0x22,
    VectorConst = 0x23,
    ByteConst = 0x24,
    IntZero = 0x25,
    IntOne = 0x26,
    True = 0x27,
    False = 0x28,
    NoObject = 0x2A,
    TransformConst = 0x2B,
    TextConst = 0x2C,
    IntConstByte = 0x2D,
    NoInterface = 0x2E,
    DynamicCast = 0x2F,
    StructConst = 0x30,
    EndStructConst = 0x31,
    SetArray = 0x32,
    EndArray = 0x33,
    PropertyConst = 0x34,
    UnicodeStringConst = 0x35,
    Int64Const = 0x36,
    UInt64Const = 0x37,
    DoubleConst = 0x38,
    SetSet = 0x39,
    EndSet = 0x3A,
    SetMap = 0x3B,
    EndMap = 0x3C,
    SetConst = 0x3D,
    EndSetConst = 0x3E,
    MapConst = 0x3F,
    EndMapConst = 0x40,
    StructMemberContext = 0x42,
    LetMulticastDelegate = 0x43,
    LetDelegate = 0x44,
    LocalVirtualFunction = 0x45,
    LocalFinalFunction = 0x46,
    LocalOutVariable = 0x48,
    DeprecatedOp4A = 0x4A,
    InstanceDelegate = 0x4B,
    PushExecutionFlow = 0x4C,
    PopExecutionFlow = 0x4D,
    ComputedJump = 0x4E,
    PopExecutionFlowIfNot = 0x4F,
    Breakpoint = 0x50,
    InterfaceContext = 0x51,
    ObjToInterfaceCast = 0x52,
    EndOfScript = 0x53,
    CrossInterfaceCast = 0x54,
    InterfaceToObjCast = 0x55,
    WireTracepoint = 0x5A,
    SkipOffsetConst = 0x5B,
    AddMulticastDelegate = 0x5C,
    ClearMulticastDelegate = 0x5D,
    Tracepoint = 0x5E,
    LetObj = 0x5F,
    LetWeakObjPtr = 0x60,
    BindDelegate = 0x61,
    RemoveMulticastDelegate = 0x62,
    CallMulticastDelegate = 0x63,
    LetValueOnPersistentFrame = 0x64,
    ArrayConst = 0x65,
    EndArrayConst = 0x66,
    SoftObjectConst = 0x67,
    CallMath = 0x68,
    SwitchValue = 0x69,
    InstrumentationEvent = 0x6A,
    ArrayGetByRef = 0x6B,
    ClassSparseDataVariable = 0x6C,
    FieldPathConst = 0x6D,
}

impl ExprToken {
    pub fn from_byte(b: u8) -> Option<ExprToken> {
        use ExprToken::*;
        Some(match b {
            0x00 => LocalVariable,
            0x01 => InstanceVariable,
            0x02 => DefaultVariable,
            0x04 => Return,
            0x06 => Jump,
            0x07 => JumpIfNot,
            0x09 => Assert,
            0x0B => Nothing,
            0x0F => Let,
            0x12 => ClassContext,
            0x13 => MetaCast,
            0x14 => LetBool,
            0x15 => EndParmValue,
            0x16 => EndFunctionParms,
            0x17 => SelfRef,
            0x18 => Skip,
            0x19 => Context,
            0x1A => ContextFailSilent,
            0x1B => VirtualFunction,
            0x1C => FinalFunction,
            0x1D => IntConst,
            0x1E => FloatConst,
            0x1F => StringConst,
            0x20 => ObjectConst,
            0x21 => NameConst,
            0x22 => RotationConst,
            0x23 => VectorConst,
            0x24 => ByteConst,
            0x25 => IntZero,
            0x26 => IntOne,
            0x27 => True,
            0x28 => False,
            0x2A => NoObject,
            0x2B => TransformConst,
            0x2C => TextConst,
            0x2D => IntConstByte,
            0x2E => NoInterface,
            0x2F => DynamicCast,
            0x30 => StructConst,
            0x31 => EndStructConst,
            0x32 => SetArray,
            0x33 => EndArray,
            0x34 => PropertyConst,
            0x35 => UnicodeStringConst,
            0x36 => Int64Const,
            0x37 => UInt64Const,
            0x38 => DoubleConst,
            0x39 => SetSet,
            0x3A => EndSet,
            0x3B => SetMap,
            0x3C => EndMap,
            0x3D => SetConst,
            0x3E => EndSetConst,
            0x3F => MapConst,
            0x40 => EndMapConst,
            0x42 => StructMemberContext,
            0x43 => LetMulticastDelegate,
            0x44 => LetDelegate,
            0x45 => LocalVirtualFunction,
            0x46 => LocalFinalFunction,
            0x48 => LocalOutVariable,
            0x4A => DeprecatedOp4A,
            0x4B => InstanceDelegate,
            0x4C => PushExecutionFlow,
            0x4D => PopExecutionFlow,
            0x4E => ComputedJump,
            0x4F => PopExecutionFlowIfNot,
            0x50 => Breakpoint,
            0x51 => InterfaceContext,
            0x52 => ObjToInterfaceCast,
            0x53 => EndOfScript,
            0x54 => CrossInterfaceCast,
            0x55 => InterfaceToObjCast,
            0x5A => WireTracepoint,
            0x5B => SkipOffsetConst,
            0x5C => AddMulticastDelegate,
            0x5D => ClearMulticastDelegate,
            0x5E => Tracepoint,
            0x5F => LetObj,
            0x60 => LetWeakObjPtr,
            0x61 => BindDelegate,
            0x62 => RemoveMulticastDelegate,
            0x63 => CallMulticastDelegate,
            0x64 => LetValueOnPersistentFrame,
            0x65 => ArrayConst,
            0x66 => EndArrayConst,
            0x67 => SoftObjectConst,
            0x68 => CallMath,
            0x69 => SwitchValue,
            0x6A => InstrumentationEvent,
            0x6B => ArrayGetByRef,
            0x6C => ClassSparseDataVariable,
            0x6D => FieldPathConst,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use ExprToken::*;
        match self {
            LocalVariable => "LocalVariable",
            InstanceVariable => "InstanceVariable",
            DefaultVariable => "DefaultVariable",
            Return => "Return",
            Jump => "Jump",
            JumpIfNot => "JumpIfNot",
            Assert => "Assert",
            Nothing => "Nothing",
            Let => "Let",
            ClassContext => "ClassContext",
            MetaCast => "MetaCast",
            LetBool => "LetBool",
            EndParmValue => "EndParmValue",
            EndFunctionParms => "EndFunctionParms",
            SelfRef => "Self",
            Skip => "Skip",
            Context => "Context",
            ContextFailSilent => "Context_FailSilent",
            VirtualFunction => "VirtualFunction",
            FinalFunction => "FinalFunction",
            IntConst => "IntConst",
            FloatConst => "FloatConst",
            StringConst => "StringConst",
            ObjectConst => "ObjectConst",
            NameConst => "NameConst",
            RotationConst => "RotationConst",
            VectorConst => "VectorConst",
            ByteConst => "ByteConst",
            IntZero => "IntZero",
            IntOne => "IntOne",
            True => "True",
            False => "False",
            NoObject => "NoObject",
            TransformConst => "TransformConst",
            TextConst => "TextConst",
            IntConstByte => "IntConstByte",
            NoInterface => "NoInterface",
            DynamicCast => "DynamicCast",
            StructConst => "StructConst",
            EndStructConst => "EndStructConst",
            SetArray => "SetArray",
            EndArray => "EndArray",
            PropertyConst => "PropertyConst",
            UnicodeStringConst => "UnicodeStringConst",
            Int64Const => "Int64Const",
            UInt64Const => "UInt64Const",
            DoubleConst => "DoubleConst",
            SetSet => "SetSet",
            EndSet => "EndSet",
            SetMap => "SetMap",
            EndMap => "EndMap",
            SetConst => "SetConst",
            EndSetConst => "EndSetConst",
            MapConst => "MapConst",
            EndMapConst => "EndMapConst",
            StructMemberContext => "StructMemberContext",
            LetMulticastDelegate => "LetMulticastDelegate",
            LetDelegate => "LetDelegate",
            LocalVirtualFunction => "LocalVirtualFunction",
            LocalFinalFunction => "LocalFinalFunction",
            LocalOutVariable => "LocalOutVariable",
            DeprecatedOp4A => "DeprecatedOp4A",
            InstanceDelegate => "InstanceDelegate",
            PushExecutionFlow => "PushExecutionFlow",
            PopExecutionFlow => "PopExecutionFlow",
            ComputedJump => "ComputedJump",
            PopExecutionFlowIfNot => "PopExecutionFlowIfNot",
            Breakpoint => "Breakpoint",
            InterfaceContext => "InterfaceContext",
            ObjToInterfaceCast => "ObjToInterfaceCast",
            EndOfScript => "EndOfScript",
            CrossInterfaceCast => "CrossInterfaceCast",
            InterfaceToObjCast => "InterfaceToObjCast",
            WireTracepoint => "WireTracepoint",
            SkipOffsetConst => "SkipOffsetConst",
            AddMulticastDelegate => "AddMulticastDelegate",
            ClearMulticastDelegate => "ClearMulticastDelegate",
            Tracepoint => "Tracepoint",
            LetObj => "LetObj",
            LetWeakObjPtr => "LetWeakObjPtr",
            BindDelegate => "BindDelegate",
            RemoveMulticastDelegate => "RemoveMulticastDelegate",
            CallMulticastDelegate => "CallMulticastDelegate",
            LetValueOnPersistentFrame => "LetValueOnPersistentFrame",
            ArrayConst => "ArrayConst",
            EndArrayConst => "EndArrayConst",
            SoftObjectConst => "SoftObjectConst",
            CallMath => "CallMath",
            SwitchValue => "SwitchValue",
            InstrumentationEvent => "InstrumentationEvent",
            ArrayGetByRef => "ArrayGetByRef",
            ClassSparseDataVariable => "ClassSparseDataVariable",
            FieldPathConst => "FieldPathConst",
        }
    }
}

impl fmt::Display for ExprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves the raw object handles embedded in the byte stream. Handles are
/// opaque addresses into a foreign process; the resolver owns all validity
/// checking.
pub trait SymbolResolver {
    fn is_readable(&self, addr: u64) -> bool;
    fn display_name(&self, addr: u64) -> Result<String, BpdecError>;
}

/// Resolver with no live process behind it: every handle renders as hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl SymbolResolver for NullResolver {
    fn is_readable(&self, _addr: u64) -> bool {
        false
    }

    fn display_name(&self, addr: u64) -> Result<String, BpdecError> {
        Err(BpdecError::UnknownSymbol(addr))
    }
}

/// Address-to-name table, loadable from a plain-text listing with one
/// `0xADDR Name` entry per line (`#` starts a comment).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SymbolMap {
    symbols: HashMap<u64, String>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, addr: u64, name: impl Into<String>) {
        self.symbols.insert(addr, name.into());
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn parse(text: &str) -> Result<SymbolMap, BpdecError> {
        let mut map = SymbolMap::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let lineno = i + 1;
            let mut parts = line.splitn(2, char::is_whitespace);
            let addr_text = parts.next().unwrap_or("");
            let name = parts
                .next()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or(BpdecError::MissingSymbolName(lineno))?;
            let digits = addr_text
                .strip_prefix("0x")
                .or_else(|| addr_text.strip_prefix("0X"))
                .unwrap_or(addr_text);
            let addr = u64::from_str_radix(digits, 16)
                .map_err(|_| BpdecError::InvalidSymbolAddress(lineno, addr_text.to_string()))?;
            map.insert(addr, name);
        }
        Ok(map)
    }
}

impl SymbolResolver for SymbolMap {
    fn is_readable(&self, addr: u64) -> bool {
        self.symbols.contains_key(&addr)
    }

    fn display_name(&self, addr: u64) -> Result<String, BpdecError> {
        self.symbols
            .get(&addr)
            .cloned()
            .ok_or(BpdecError::UnknownSymbol(addr))
    }
}

/// Metadata surface of one scripted function, supplied by the surrounding
/// reflection dumper.
pub trait ScriptFunction {
    fn name(&self) -> String;
    fn owner_name(&self) -> String;
    fn flags_text(&self) -> String;
    fn script(&self) -> Vec<u8>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompiledFunction {
    pub name: String,
    pub owner_name: String,
    pub flags_text: String,
    pub script_size: usize,
    pub pseudocode: String,
}

// Positioned, bounds-checked reader over one script body. Never errors:
// a read past the end yields a zero value and clamps the position.
struct ScriptReader<'a> {
    script: &'a [u8],
    pos: usize,
}

impl<'a> ScriptReader<'a> {
    fn new(script: &'a [u8]) -> Self {
        Self { script, pos: 0 }
    }

    fn has_more(&self) -> bool {
        self.pos < self.script.len()
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.pos)
    }

    fn peek_token(&self) -> Option<ExprToken> {
        match self.script.get(self.pos) {
            Some(&b) => ExprToken::from_byte(b),
            None => Some(ExprToken::EndOfScript),
        }
    }

    fn read_u8(&mut self) -> u8 {
        if self.remaining() < 1 {
            return 0;
        }
        let v = self.script[self.pos];
        self.pos += 1;
        v
    }

    fn read_u16(&mut self) -> u16 {
        if self.remaining() < 2 {
            self.pos = self.script.len();
            return 0;
        }
        let v = LittleEndian::read_u16(&self.script[self.pos..]);
        self.pos += 2;
        v
    }

    fn read_i32(&mut self) -> i32 {
        if self.remaining() < 4 {
            self.pos = self.script.len();
            return 0;
        }
        let v = LittleEndian::read_i32(&self.script[self.pos..]);
        self.pos += 4;
        v
    }

    fn read_i64(&mut self) -> i64 {
        if self.remaining() < 8 {
            self.pos = self.script.len();
            return 0;
        }
        let v = LittleEndian::read_i64(&self.script[self.pos..]);
        self.pos += 8;
        v
    }

    fn read_u64(&mut self) -> u64 {
        if self.remaining() < 8 {
            self.pos = self.script.len();
            return 0;
        }
        let v = LittleEndian::read_u64(&self.script[self.pos..]);
        self.pos += 8;
        v
    }

    fn read_f32(&mut self) -> f32 {
        if self.remaining() < 4 {
            self.pos = self.script.len();
            return 0.0;
        }
        let v = LittleEndian::read_f32(&self.script[self.pos..]);
        self.pos += 4;
        v
    }

    fn read_f64(&mut self) -> f64 {
        if self.remaining() < 8 {
            self.pos = self.script.len();
            return 0.0;
        }
        let v = LittleEndian::read_f64(&self.script[self.pos..]);
        self.pos += 8;
        v
    }

    // Raw object handle: 8 opaque bytes, never dereferenced here.
    fn read_pointer(&mut self) -> u64 {
        self.read_u64()
    }

    fn read_str(&mut self) -> String {
        let mut out = String::new();
        while self.pos < self.script.len() {
            let b = self.script[self.pos];
            self.pos += 1;
            if b == 0 {
                break;
            }
            out.push(b as char);
        }
        out
    }

    // UTF-16LE code units until a zero unit. Units >= 128 are kept as
    // \uXXXX escapes so the result stays plain ASCII text.
    fn read_wide_str(&mut self) -> String {
        let mut out = String::new();
        while self.pos + 2 <= self.script.len() {
            let ch = LittleEndian::read_u16(&self.script[self.pos..]);
            self.pos += 2;
            if ch == 0 {
                break;
            }
            if ch < 128 {
                out.push(ch as u8 as char);
            } else {
                out.push_str(&format!("\\u{ch:04X}"));
            }
        }
        out
    }

    fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.script.len());
    }
}

fn resolve_object_name(resolver: &dyn SymbolResolver, ptr: u64) -> String {
    if ptr == 0 {
        return "None".into();
    }
    if !resolver.is_readable(ptr) {
        return format!("0x{ptr:X}");
    }
    match resolver.display_name(ptr) {
        Ok(name) if !name.is_empty() => name,
        _ => format!("0x{ptr:X}"),
    }
}

// Expressions joined with ", " until EndFunctionParms, which is consumed
// but not emitted. At the depth limit parse_expression returns without
// consuming a byte, so the loop also stops whenever the cursor makes no
// forward progress.
fn parse_call_args(r: &mut ScriptReader<'_>, resolver: &dyn SymbolResolver, depth: u32) -> String {
    let mut args = String::new();
    let mut first = true;

    while r.has_more() {
        if r.peek_token() == Some(ExprToken::EndFunctionParms) {
            r.read_u8();
            break;
        }
        if !first {
            args.push_str(", ");
        }
        first = false;
        let before = r.position();
        args.push_str(&parse_expression(r, resolver, depth + 1));
        if r.position() == before {
            break;
        }
    }

    args
}

// Elements until the given end marker, which is consumed but not emitted.
// Stops on a stalled cursor, same as parse_call_args.
fn parse_until(
    r: &mut ScriptReader<'_>,
    resolver: &dyn SymbolResolver,
    depth: u32,
    end: ExprToken,
) -> Vec<String> {
    let mut items = Vec::new();
    while r.has_more() && r.peek_token() != Some(end) {
        let before = r.position();
        items.push(parse_expression(r, resolver, depth + 1));
        if r.position() == before {
            break;
        }
    }
    if r.peek_token() == Some(end) {
        r.read_u8();
    }
    items
}

fn join_pairs(items: &[String]) -> String {
    items
        .chunks(2)
        .map(|c| {
            if c.len() == 2 {
                format!("{}: {}", c[0], c[1])
            } else {
                c[0].clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// One expression: read a token, consume its operands, recurse where the
// token embeds sub-expressions. The per-token byte consumption is fixed by
// the VM's serialized format; a wrong width here desynchronizes everything
// after it.
fn parse_expression(r: &mut ScriptReader<'_>, resolver: &dyn SymbolResolver, depth: u32) -> String {
    if !r.has_more() || depth > MAX_PARSE_DEPTH {
        return "/* truncated */".into();
    }

    let byte = r.read_u8();
    let Some(token) = ExprToken::from_byte(byte) else {
        // Operand width unknown, so everything after this point is
        // best-effort.
        return format!("/* unknown opcode 0x{byte:02X} */");
    };

    match token {
        // --- Constants ---
        ExprToken::IntConst => r.read_i32().to_string(),
        ExprToken::FloatConst => format!("{:.4}f", r.read_f32()),
        ExprToken::DoubleConst => format!("{:.6}", r.read_f64()),
        ExprToken::StringConst => format!("\"{}\"", r.read_str()),
        ExprToken::UnicodeStringConst => format!("L\"{}\"", r.read_wide_str()),
        ExprToken::ByteConst | ExprToken::IntConstByte => r.read_u8().to_string(),
        ExprToken::Int64Const => format!("{}LL", r.read_i64()),
        ExprToken::UInt64Const => format!("{}ULL", r.read_u64()),

        ExprToken::IntZero => "0".into(),
        ExprToken::IntOne => "1".into(),
        ExprToken::True => "true".into(),
        ExprToken::False => "false".into(),
        ExprToken::NoObject | ExprToken::NoInterface => "nullptr".into(),
        ExprToken::SelfRef => "this".into(),
        ExprToken::Nothing => String::new(),

        // --- Variable references ---
        ExprToken::LocalVariable
        | ExprToken::LocalOutVariable
        | ExprToken::InstanceVariable
        | ExprToken::DefaultVariable
        | ExprToken::ClassSparseDataVariable => {
            let prop = r.read_pointer();
            resolve_object_name(resolver, prop)
        }

        // --- Object/Name constants ---
        ExprToken::ObjectConst | ExprToken::PropertyConst => {
            let obj = r.read_pointer();
            resolve_object_name(resolver, obj)
        }

        ExprToken::NameConst => format!("FName(\"{}\")", r.read_str()),

        ExprToken::SoftObjectConst => {
            let inner = parse_expression(r, resolver, depth + 1);
            format!("SoftObject({inner})")
        }

        ExprToken::FieldPathConst => {
            let inner = parse_expression(r, resolver, depth + 1);
            format!("FieldPath({inner})")
        }

        // --- Function calls ---
        ExprToken::FinalFunction | ExprToken::LocalFinalFunction => {
            let func = resolve_object_name(resolver, r.read_pointer());
            let args = parse_call_args(r, resolver, depth);
            format!("{func}({args})")
        }

        ExprToken::VirtualFunction | ExprToken::LocalVirtualFunction => {
            let func = r.read_str();
            let args = parse_call_args(r, resolver, depth);
            format!("{func}({args})")
        }

        ExprToken::CallMath => {
            let func = resolve_object_name(resolver, r.read_pointer());
            let args = parse_call_args(r, resolver, depth);
            format!("Math::{func}({args})")
        }

        ExprToken::CallMulticastDelegate => {
            let func = resolve_object_name(resolver, r.read_pointer());
            let args = parse_call_args(r, resolver, depth);
            format!("{func}.Broadcast({args})")
        }

        // --- Assignment ---
        ExprToken::Let
        | ExprToken::LetBool
        | ExprToken::LetObj
        | ExprToken::LetWeakObjPtr
        | ExprToken::LetDelegate
        | ExprToken::LetMulticastDelegate => {
            let _ = r.read_pointer(); // destination property, lhs repeats it
            let lhs = parse_expression(r, resolver, depth + 1);
            let rhs = parse_expression(r, resolver, depth + 1);
            format!("{lhs} = {rhs}")
        }

        ExprToken::LetValueOnPersistentFrame => {
            let dest = resolve_object_name(resolver, r.read_pointer());
            let src = parse_expression(r, resolver, depth + 1);
            format!("{dest} = {src}")
        }

        // --- Control flow ---
        ExprToken::Jump => {
            let target = r.read_i32() as u32;
            format!("goto 0x{target:04X}")
        }

        ExprToken::JumpIfNot => {
            let target = r.read_i32() as u32;
            let cond = parse_expression(r, resolver, depth + 1);
            format!("if (!{cond}) goto 0x{target:04X}")
        }

        ExprToken::Return => {
            let value = parse_expression(r, resolver, depth + 1);
            if value.is_empty() {
                "return".into()
            } else {
                format!("return {value}")
            }
        }

        // Flow-stack bookkeeping has no source-level equivalent; rendered
        // as comments rather than fabricated syntax.
        ExprToken::PushExecutionFlow => {
            let target = r.read_i32() as u32;
            format!("/* push flow 0x{target:04X} */")
        }

        ExprToken::PopExecutionFlow => "/* pop flow */".into(),

        ExprToken::PopExecutionFlowIfNot => {
            let cond = parse_expression(r, resolver, depth + 1);
            format!("/* pop flow if !{cond} */")
        }

        ExprToken::ComputedJump => {
            let expr = parse_expression(r, resolver, depth + 1);
            format!("goto [{expr}]")
        }

        // --- Context (object.member) ---
        ExprToken::Context | ExprToken::ContextFailSilent => {
            let obj = parse_expression(r, resolver, depth + 1);
            r.skip(4 + 1); // jump offset on null context + property type
            let _ = r.read_pointer();
            let member = parse_expression(r, resolver, depth + 1);
            format!("{obj}.{member}")
        }

        ExprToken::ClassContext => {
            let obj = parse_expression(r, resolver, depth + 1);
            r.skip(4 + 1);
            let _ = r.read_pointer();
            let member = parse_expression(r, resolver, depth + 1);
            format!("{obj}::{member}")
        }

        ExprToken::InterfaceContext => parse_expression(r, resolver, depth + 1),

        // --- Casts ---
        ExprToken::DynamicCast
        | ExprToken::ObjToInterfaceCast
        | ExprToken::CrossInterfaceCast
        | ExprToken::InterfaceToObjCast => {
            let class = resolve_object_name(resolver, r.read_pointer());
            let expr = parse_expression(r, resolver, depth + 1);
            format!("Cast<{class}>({expr})")
        }

        ExprToken::MetaCast => {
            let class = resolve_object_name(resolver, r.read_pointer());
            let expr = parse_expression(r, resolver, depth + 1);
            format!("MetaCast<{class}>({expr})")
        }

        // --- Vector/Rotation/Transform constants ---
        ExprToken::VectorConst => {
            let (x, y, z) = (r.read_f32(), r.read_f32(), r.read_f32());
            format!("FVector({x:.2}, {y:.2}, {z:.2})")
        }

        ExprToken::RotationConst => {
            let (pitch, yaw, roll) = (r.read_f32(), r.read_f32(), r.read_f32());
            format!("FRotator({pitch:.2}, {yaw:.2}, {roll:.2})")
        }

        ExprToken::TransformConst => {
            // Rotation quat (4 floats) + translation (3) + scale (3)
            r.skip(4 * 10);
            "FTransform(...)".into()
        }

        // --- Container literals ---
        ExprToken::StructConst => {
            let name = resolve_object_name(resolver, r.read_pointer());
            let _size = r.read_i32();
            let fields = parse_until(r, resolver, depth, ExprToken::EndStructConst);
            format!("{name}{{ {} }}", fields.join(", "))
        }

        ExprToken::ArrayConst => {
            let _ = r.read_pointer(); // inner property
            let _num = r.read_i32();
            let elems = parse_until(r, resolver, depth, ExprToken::EndArrayConst);
            format!("[{}]", elems.join(", "))
        }

        ExprToken::SetConst => {
            let _ = r.read_pointer();
            let _num = r.read_i32();
            let elems = parse_until(r, resolver, depth, ExprToken::EndSetConst);
            format!("Set{{ {} }}", elems.join(", "))
        }

        ExprToken::MapConst => {
            let _ = r.read_pointer(); // key property
            let _ = r.read_pointer(); // value property
            let _num = r.read_i32();
            let items = parse_until(r, resolver, depth, ExprToken::EndMapConst);
            format!("Map{{ {} }}", join_pairs(&items))
        }

        ExprToken::SetArray => {
            let target = parse_expression(r, resolver, depth + 1);
            let elems = parse_until(r, resolver, depth, ExprToken::EndArray);
            format!("{target} = [{}]", elems.join(", "))
        }

        ExprToken::SetSet => {
            let target = parse_expression(r, resolver, depth + 1);
            let _num = r.read_i32();
            let elems = parse_until(r, resolver, depth, ExprToken::EndSet);
            format!("{target} = Set[{}]", elems.join(", "))
        }

        ExprToken::SetMap => {
            let target = parse_expression(r, resolver, depth + 1);
            let _num = r.read_i32();
            let items = parse_until(r, resolver, depth, ExprToken::EndMap);
            format!("{target} = Map[{}]", join_pairs(&items))
        }

        ExprToken::ArrayGetByRef => {
            let array = parse_expression(r, resolver, depth + 1);
            let index = parse_expression(r, resolver, depth + 1);
            format!("{array}[{index}]")
        }

        // --- Delegates ---
        ExprToken::InstanceDelegate | ExprToken::BindDelegate => {
            let func = r.read_str();
            let obj = parse_expression(r, resolver, depth + 1);
            format!("Delegate({func}, {obj})")
        }

        ExprToken::AddMulticastDelegate => {
            let delegate = parse_expression(r, resolver, depth + 1);
            let func = parse_expression(r, resolver, depth + 1);
            format!("{delegate}.Add({func})")
        }

        ExprToken::RemoveMulticastDelegate => {
            let delegate = parse_expression(r, resolver, depth + 1);
            let func = parse_expression(r, resolver, depth + 1);
            format!("{delegate}.Remove({func})")
        }

        ExprToken::ClearMulticastDelegate => {
            let delegate = parse_expression(r, resolver, depth + 1);
            format!("{delegate}.Clear()")
        }

        // --- Skip / Assert ---
        ExprToken::Skip => {
            let _skip_size = r.read_i32();
            parse_expression(r, resolver, depth + 1)
        }

        ExprToken::SkipOffsetConst => {
            let value = r.read_i32() as u32;
            format!("/* skip offset 0x{value:04X} */")
        }

        ExprToken::Assert => {
            let _line = r.read_u16();
            let _in_debug = r.read_u8();
            let cond = parse_expression(r, resolver, depth + 1);
            format!("assert({cond})")
        }

        // --- SwitchValue ---
        ExprToken::SwitchValue => {
            let num_cases = r.read_u16();
            let _end_offset = r.read_i32();
            let selector = parse_expression(r, resolver, depth + 1);
            let mut out = format!("switch ({selector}) {{ ");
            for _ in 0..num_cases {
                let case_value = parse_expression(r, resolver, depth + 1);
                let _next_case_offset = r.read_i32();
                let case_body = parse_expression(r, resolver, depth + 1);
                out.push_str(&format!("case {case_value}: {case_body}; "));
            }
            let default_body = parse_expression(r, resolver, depth + 1);
            out.push_str(&format!("default: {default_body} }}"));
            out
        }

        // --- TextConst ---
        ExprToken::TextConst => {
            let text_type = r.read_u8();
            match text_type {
                0 => "FText::GetEmpty()".into(),
                1 => {
                    let src = parse_expression(r, resolver, depth + 1);
                    let key = parse_expression(r, resolver, depth + 1);
                    let ns = parse_expression(r, resolver, depth + 1);
                    format!("NSLOCTEXT({ns}, {key}, {src})")
                }
                2 => {
                    let src = parse_expression(r, resolver, depth + 1);
                    format!("FText::AsCultureInvariant({src})")
                }
                _ => "FText(...)".into(),
            }
        }

        ExprToken::StructMemberContext => {
            let member = resolve_object_name(resolver, r.read_pointer());
            let base = parse_expression(r, resolver, depth + 1);
            format!("{base}.{member}")
        }

        // --- Instrumentation / debug ---
        ExprToken::Breakpoint => "/* breakpoint */".into(),
        ExprToken::Tracepoint => "/* tracepoint */".into(),
        ExprToken::WireTracepoint => "/* wire tracepoint */".into(),
        ExprToken::DeprecatedOp4A => "/* deprecated op 0x4A */".into(),

        ExprToken::InstrumentationEvent => {
            let event_type = r.read_u8();
            format!("/* instrumentation event {event_type} */")
        }

        // --- End markers: empty fragments, loop terminators only ---
        ExprToken::EndOfScript
        | ExprToken::EndFunctionParms
        | ExprToken::EndParmValue
        | ExprToken::EndStructConst
        | ExprToken::EndArray
        | ExprToken::EndArrayConst
        | ExprToken::EndSet
        | ExprToken::EndMap
        | ExprToken::EndSetConst
        | ExprToken::EndMapConst => String::new(),
    }
}

/// Decompiles one function's raw instruction stream to annotated pseudocode,
/// one `  <hex offset>: <expr>` line per top-level statement. Never fails:
/// malformed input degrades to best-effort text.
pub fn decompile_bytes(script: &[u8], resolver: &dyn SymbolResolver) -> String {
    if script.is_empty() {
        return "// Empty script\n".into();
    }

    let mut r = ScriptReader::new(script);
    let mut out = String::new();
    let mut emitted = 0usize;

    while r.has_more() {
        match r.peek_token() {
            Some(ExprToken::EndOfScript) => break,
            Some(ExprToken::Nothing) => {
                r.read_u8();
                continue;
            }
            _ => {}
        }

        let offset = r.position();
        let expr = parse_expression(&mut r, resolver, 0);

        if !expr.is_empty() {
            out.push_str(&format!("  {offset:04X}: {expr}\n"));
            emitted += 1;
            if emitted >= MAX_STATEMENTS {
                out.push_str("  // ... truncated (>2000 statements)\n");
                break;
            }
        }
    }

    out
}

/// Decompiles a function via its metadata surface.
pub fn decompile_function(
    func: &dyn ScriptFunction,
    resolver: &dyn SymbolResolver,
) -> DecompiledFunction {
    let script = func.script();
    DecompiledFunction {
        name: func.name(),
        owner_name: func.owner_name(),
        flags_text: func.flags_text(),
        script_size: script.len(),
        pseudocode: decompile_bytes(&script, resolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(entries: &[(u64, &str)]) -> SymbolMap {
        let mut map = SymbolMap::new();
        for &(addr, name) in entries {
            map.insert(addr, name);
        }
        map
    }

    fn ptr_bytes(ptr: u64) -> [u8; 8] {
        ptr.to_le_bytes()
    }

    #[test]
    fn empty_script() {
        assert_eq!(decompile_bytes(&[], &NullResolver), "// Empty script\n");
    }

    #[test]
    fn flat_constant_sequence() {
        let script = [
            ExprToken::IntZero as u8,
            ExprToken::IntOne as u8,
            ExprToken::True as u8,
            ExprToken::False as u8,
            ExprToken::EndOfScript as u8,
        ];
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: 0\n  0001: 1\n  0002: true\n  0003: false\n");
    }

    #[test]
    fn decoding_is_idempotent() {
        let mut script = vec![ExprToken::Jump as u8];
        script.extend_from_slice(&0x40i32.to_le_bytes());
        script.push(ExprToken::True as u8);
        let a = decompile_bytes(&script, &NullResolver);
        let b = decompile_bytes(&script, &NullResolver);
        assert_eq!(a, b);
    }

    #[test]
    fn nothing_is_skipped_without_a_line() {
        let script = [
            ExprToken::Nothing as u8,
            ExprToken::IntOne as u8,
            ExprToken::EndOfScript as u8,
        ];
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0001: 1\n");
    }

    #[test]
    fn recursion_depth_is_bounded() {
        // 100 nested SoftObjectConst wrappers; the decoder must cut over to
        // the truncation placeholder instead of recursing without bound.
        let script = vec![ExprToken::SoftObjectConst as u8; 100];
        let out = decompile_bytes(&script, &NullResolver);
        assert!(out.contains("/* truncated */"));
    }

    #[test]
    fn call_args_terminate_at_depth_limit() {
        // A call opcode sitting exactly at the recursion limit: every
        // argument decode returns the truncation placeholder without
        // consuming a byte, and the argument loop must not spin on that.
        let mut script = vec![ExprToken::SoftObjectConst as u8; MAX_PARSE_DEPTH as usize];
        script.push(ExprToken::FinalFunction as u8);
        script.extend_from_slice(&ptr_bytes(0xDEAD));
        script.push(ExprToken::True as u8);
        script.push(ExprToken::EndFunctionParms as u8);

        let out = decompile_bytes(&script, &NullResolver);
        assert!(out.contains("/* truncated */"));
    }

    #[test]
    fn container_elements_terminate_at_depth_limit() {
        let mut script = vec![ExprToken::SoftObjectConst as u8; MAX_PARSE_DEPTH as usize];
        script.push(ExprToken::SetArray as u8);
        script.push(ExprToken::IntZero as u8);
        script.push(ExprToken::IntOne as u8);
        script.push(ExprToken::EndArray as u8);

        let out = decompile_bytes(&script, &NullResolver);
        assert!(out.contains("/* truncated */"));
    }

    #[test]
    fn final_function_call_args() {
        let mut script = vec![ExprToken::FinalFunction as u8];
        script.extend_from_slice(&ptr_bytes(0xDEAD));
        script.push(ExprToken::IntConst as u8);
        script.extend_from_slice(&5i32.to_le_bytes());
        script.push(ExprToken::IntConst as u8);
        script.extend_from_slice(&7i32.to_le_bytes());
        script.push(ExprToken::EndFunctionParms as u8);
        script.push(ExprToken::EndOfScript as u8);

        let resolver = resolver_with(&[(0xDEAD, "DoThing")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: DoThing(5, 7)\n");
    }

    #[test]
    fn call_with_no_args() {
        let mut script = vec![ExprToken::FinalFunction as u8];
        script.extend_from_slice(&ptr_bytes(0x10));
        script.push(ExprToken::EndFunctionParms as u8);

        let resolver = resolver_with(&[(0x10, "Tick")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: Tick()\n");
    }

    #[test]
    fn virtual_function_uses_inline_name() {
        let mut script = vec![ExprToken::VirtualFunction as u8];
        script.extend_from_slice(b"OnHit\0");
        script.push(ExprToken::True as u8);
        script.push(ExprToken::EndFunctionParms as u8);

        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: OnHit(true)\n");
    }

    #[test]
    fn truncated_int_const_reads_zero() {
        let script = [ExprToken::IntConst as u8];
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: 0\n");
    }

    #[test]
    fn unknown_opcode_becomes_comment() {
        let out = decompile_bytes(&[0xEE], &NullResolver);
        assert_eq!(out, "  0000: /* unknown opcode 0xEE */\n");
    }

    #[test]
    fn struct_literal_round_trip() {
        let mut script = vec![ExprToken::StructConst as u8];
        script.extend_from_slice(&ptr_bytes(0x77));
        script.extend_from_slice(&8i32.to_le_bytes()); // serialized size
        script.push(ExprToken::IntConst as u8);
        script.extend_from_slice(&1i32.to_le_bytes());
        script.push(ExprToken::IntConst as u8);
        script.extend_from_slice(&2i32.to_le_bytes());
        script.push(ExprToken::EndStructConst as u8);

        let resolver = resolver_with(&[(0x77, "FVector2D")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: FVector2D{ 1, 2 }\n");
    }

    #[test]
    fn assignment_resolves_both_sides() {
        let mut script = vec![ExprToken::Let as u8];
        script.extend_from_slice(&ptr_bytes(0x1)); // property handle, not printed
        script.push(ExprToken::LocalVariable as u8);
        script.extend_from_slice(&ptr_bytes(0x2));
        script.push(ExprToken::IntConst as u8);
        script.extend_from_slice(&4i32.to_le_bytes());

        let resolver = resolver_with(&[(0x2, "Health")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: Health = 4\n");
    }

    #[test]
    fn jump_if_not_formats_target() {
        let mut script = vec![ExprToken::JumpIfNot as u8];
        script.extend_from_slice(&0x20i32.to_le_bytes());
        script.push(ExprToken::True as u8);
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: if (!true) goto 0x0020\n");
    }

    #[test]
    fn switch_value_decodes_cases() {
        let mut script = vec![ExprToken::SwitchValue as u8];
        script.extend_from_slice(&1u16.to_le_bytes()); // one case
        script.extend_from_slice(&0i32.to_le_bytes()); // end offset
        script.push(ExprToken::IntZero as u8); // selector
        script.push(ExprToken::IntOne as u8); // case value
        script.extend_from_slice(&0i32.to_le_bytes()); // next-case offset
        script.push(ExprToken::True as u8); // case body
        script.push(ExprToken::False as u8); // default body

        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: switch (0) { case 1: true; default: false }\n");
    }

    #[test]
    fn context_consumes_header_and_joins_member() {
        // obj expr, 4-byte null-context jump offset + 1-byte property type,
        // 8-byte property handle, member expr. A wrong header width here
        // desynchronizes everything after the context.
        let mut script = vec![ExprToken::Context as u8];
        script.push(ExprToken::LocalVariable as u8);
        script.extend_from_slice(&ptr_bytes(0x2));
        script.extend_from_slice(&[0u8; 4 + 1]);
        script.extend_from_slice(&ptr_bytes(0x99));
        script.push(ExprToken::LocalVariable as u8);
        script.extend_from_slice(&ptr_bytes(0x3));
        script.push(ExprToken::EndOfScript as u8);

        let resolver = resolver_with(&[(0x2, "Pawn"), (0x3, "Health")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: Pawn.Health\n");
    }

    #[test]
    fn class_context_uses_scope_operator() {
        let mut script = vec![ExprToken::ClassContext as u8];
        script.push(ExprToken::ObjectConst as u8);
        script.extend_from_slice(&ptr_bytes(0x4));
        script.extend_from_slice(&[0u8; 4 + 1]);
        script.extend_from_slice(&ptr_bytes(0x99));
        script.push(ExprToken::LocalVariable as u8);
        script.extend_from_slice(&ptr_bytes(0x5));

        let resolver = resolver_with(&[(0x4, "GameMode"), (0x5, "Score")]);
        let out = decompile_bytes(&script, &resolver);
        assert_eq!(out, "  0000: GameMode::Score\n");
    }

    #[test]
    fn casts_resolve_target_class() {
        let mut script = vec![ExprToken::DynamicCast as u8];
        script.extend_from_slice(&ptr_bytes(0x8));
        script.push(ExprToken::SelfRef as u8);

        let resolver = resolver_with(&[(0x8, "APawn")]);
        assert_eq!(
            decompile_bytes(&script, &resolver),
            "  0000: Cast<APawn>(this)\n"
        );

        let mut script = vec![ExprToken::MetaCast as u8];
        script.extend_from_slice(&ptr_bytes(0x8));
        script.push(ExprToken::NoObject as u8);
        assert_eq!(
            decompile_bytes(&script, &resolver),
            "  0000: MetaCast<APawn>(nullptr)\n"
        );
    }

    #[test]
    fn text_const_variants() {
        assert_eq!(
            decompile_bytes(&[ExprToken::TextConst as u8, 0], &NullResolver),
            "  0000: FText::GetEmpty()\n"
        );

        let mut script = vec![ExprToken::TextConst as u8, 1];
        script.push(ExprToken::StringConst as u8);
        script.extend_from_slice(b"Hello\0");
        script.push(ExprToken::StringConst as u8);
        script.extend_from_slice(b"Key\0");
        script.push(ExprToken::StringConst as u8);
        script.extend_from_slice(b"Ns\0");
        assert_eq!(
            decompile_bytes(&script, &NullResolver),
            "  0000: NSLOCTEXT(\"Ns\", \"Key\", \"Hello\")\n"
        );
    }

    #[test]
    fn array_const_collects_elements() {
        let mut script = vec![ExprToken::ArrayConst as u8];
        script.extend_from_slice(&ptr_bytes(0x5)); // inner property
        script.extend_from_slice(&2i32.to_le_bytes());
        script.push(ExprToken::IntZero as u8);
        script.push(ExprToken::IntOne as u8);
        script.push(ExprToken::EndArrayConst as u8);
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: [0, 1]\n");
    }

    #[test]
    fn map_const_pairs_keys_and_values() {
        let mut script = vec![ExprToken::MapConst as u8];
        script.extend_from_slice(&ptr_bytes(0x5));
        script.extend_from_slice(&ptr_bytes(0x6));
        script.extend_from_slice(&1i32.to_le_bytes());
        script.push(ExprToken::IntZero as u8);
        script.push(ExprToken::True as u8);
        script.push(ExprToken::EndMapConst as u8);
        let out = decompile_bytes(&script, &NullResolver);
        assert_eq!(out, "  0000: Map{ 0: true }\n");
    }

    #[test]
    fn statement_cap_appends_marker() {
        let script = vec![ExprToken::True as u8; 2500];
        let out = decompile_bytes(&script, &NullResolver);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2001);
        assert_eq!(lines[2000], "  // ... truncated (>2000 statements)");
    }

    #[test]
    fn resolver_fallbacks() {
        // Null handle renders as None.
        let mut script = vec![ExprToken::ObjectConst as u8];
        script.extend_from_slice(&ptr_bytes(0));
        assert_eq!(decompile_bytes(&script, &NullResolver), "  0000: None\n");

        // Unreadable handle renders as hex.
        let mut script = vec![ExprToken::ObjectConst as u8];
        script.extend_from_slice(&ptr_bytes(0xABC));
        assert_eq!(decompile_bytes(&script, &NullResolver), "  0000: 0xABC\n");

        // Empty resolved names fall back to hex as well.
        let resolver = resolver_with(&[(0xABC, "")]);
        assert_eq!(decompile_bytes(&script, &resolver), "  0000: 0xABC\n");
    }

    #[test]
    fn reader_clamps_short_reads() {
        let mut r = ScriptReader::new(&[0x01, 0x02]);
        assert_eq!(r.read_i32(), 0);
        assert_eq!(r.position(), 2);
        assert!(!r.has_more());
        assert_eq!(r.read_u8(), 0);
        assert_eq!(r.peek_token(), Some(ExprToken::EndOfScript));
    }

    #[test]
    fn reader_wide_string_escapes_high_units() {
        // "A" + U+0105 + terminator
        let bytes = [0x41, 0x00, 0x05, 0x01, 0x00, 0x00];
        let mut r = ScriptReader::new(&bytes);
        assert_eq!(r.read_wide_str(), "A\\u0105");
        assert_eq!(r.position(), 6);
    }

    #[test]
    fn reader_skip_clamps_to_end() {
        let mut r = ScriptReader::new(&[1, 2, 3]);
        r.skip(10);
        assert_eq!(r.position(), 3);
    }

    #[test]
    fn token_round_trip() {
        assert_eq!(ExprToken::from_byte(0x68), Some(ExprToken::CallMath));
        assert_eq!(ExprToken::CallMath.name(), "CallMath");
        assert_eq!(ExprToken::SelfRef.to_string(), "Self");
        assert_eq!(ExprToken::from_byte(0x03), None);
        assert_eq!(ExprToken::from_byte(0xFF), None);
    }

    #[test]
    fn symbol_map_parses_listing() {
        let map = SymbolMap::parse("# comment\n0x1000 GetOwner\n2000 SetActorLocation\n").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.display_name(0x1000).unwrap(), "GetOwner");
        assert_eq!(map.display_name(0x2000).unwrap(), "SetActorLocation");
        assert!(map.is_readable(0x2000));
        assert!(!map.is_readable(0x3000));
    }

    #[test]
    fn symbol_map_rejects_bad_lines() {
        assert!(matches!(
            SymbolMap::parse("0x1000"),
            Err(BpdecError::MissingSymbolName(1))
        ));
        assert!(matches!(
            SymbolMap::parse("\nnothex GetOwner"),
            Err(BpdecError::InvalidSymbolAddress(2, _))
        ));
    }

    struct StubFunction;

    impl ScriptFunction for StubFunction {
        fn name(&self) -> String {
            "ReceiveBeginPlay".into()
        }
        fn owner_name(&self) -> String {
            "BP_PlayerController_C".into()
        }
        fn flags_text(&self) -> String {
            "Event|BlueprintEvent".into()
        }
        fn script(&self) -> Vec<u8> {
            vec![ExprToken::IntOne as u8, ExprToken::EndOfScript as u8]
        }
    }

    #[test]
    fn decompile_function_carries_metadata() {
        let result = decompile_function(&StubFunction, &NullResolver);
        assert_eq!(result.name, "ReceiveBeginPlay");
        assert_eq!(result.owner_name, "BP_PlayerController_C");
        assert_eq!(result.flags_text, "Event|BlueprintEvent");
        assert_eq!(result.script_size, 2);
        assert_eq!(result.pseudocode, "  0000: 1\n");
    }
}
