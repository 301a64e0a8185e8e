/// The family of a PostgreSQL array's elements, used to decide which Rust
/// element types may decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Uuid,
    Inet,
    Cidr,
    Timestamptz,
    Timestamp,
    Date,
    Json,
    Jsonb,
    Oid,
    Cid,
}

/// A known array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayType {
    pub oid: u32,
    pub name: &'static str,
    pub element_oid: u32,
    pub element: ElementKind,
}

const fn entry(oid: u32, name: &'static str, element_oid: u32, element: ElementKind) -> ArrayType {
    ArrayType { oid, name, element_oid, element }
}

static ARRAY_TYPES: &[ArrayType] = &[
    entry(1000, "_bool", 16, ElementKind::Bool),
    entry(1005, "_int2", 21, ElementKind::Int2),
    entry(1007, "_int4", 23, ElementKind::Int4),
    entry(1016, "_int8", 20, ElementKind::Int8),
    entry(1021, "_float4", 700, ElementKind::Float4),
    entry(1022, "_float8", 701, ElementKind::Float8),
    entry(1231, "_numeric", 1700, ElementKind::Numeric),
    entry(1009, "_text", 25, ElementKind::Text),
    entry(1015, "_varchar", 1043, ElementKind::Text),
    entry(1014, "_bpchar", 1042, ElementKind::Text),
    entry(1003, "_name", 19, ElementKind::Text),
    entry(2951, "_uuid", 2950, ElementKind::Uuid),
    entry(1041, "_inet", 869, ElementKind::Inet),
    entry(651, "_cidr", 650, ElementKind::Cidr),
    entry(1185, "_timestamptz", 1184, ElementKind::Timestamptz),
    entry(1115, "_timestamp", 1114, ElementKind::Timestamp),
    entry(1182, "_date", 1082, ElementKind::Date),
    entry(199, "_json", 114, ElementKind::Json),
    entry(3807, "_jsonb", 3802, ElementKind::Jsonb),
    entry(1028, "_oid", 26, ElementKind::Oid),
    entry(1012, "_cid", 29, ElementKind::Cid),
];

/// Looks up an array type by its OID.
pub fn array_type(oid: u32) -> Option<&'static ArrayType> {
    ARRAY_TYPES.iter().find(|t| t.oid == oid)
}
