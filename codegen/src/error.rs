/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors raised while loading models, compiling operations and invoking them.

use awsgen_http::response::PayloadDecodeError;
use awsgen_http::result::SdkError;
use awsgen_types::date_time::{DateTimeFormatError, DateTimeParseError};

/// The service model is malformed, inconsistent or uses an unsupported feature.
///
/// Model errors are raised at compile time and abort generation of the affected operation
/// only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The model document is not valid JSON or does not have the expected layout.
    #[error("failed to parse service model: {0}")]
    Parse(String),

    /// `metadata.protocol` names a protocol with no serializer.
    #[error("unsupported protocol `{0}`")]
    UnsupportedProtocol(String),

    /// A shape declares a type the compiler does not know.
    #[error("shape `{shape}` has unsupported type `{kind}`")]
    UnsupportedShapeType {
        /// Shape name
        shape: String,
        /// The declared `type`
        kind: String,
    },

    /// A member declares a `location` the compiler does not know.
    #[error("member `{member}` of `{structure}` has unsupported location `{location}`")]
    UnsupportedLocation {
        /// Structure declaring the member
        structure: String,
        /// Member name
        member: String,
        /// The declared `location`
        location: String,
    },

    /// A shape reference points nowhere.
    #[error("unknown shape `{0}`")]
    UnknownShape(String),

    /// A shape was used where a shape of another kind is required.
    #[error("shape `{shape}` must be a {expected}, found {found}")]
    WrongShapeKind {
        /// Shape name
        shape: String,
        /// Kind required at the reference
        expected: &'static str,
        /// Kind of the shape
        found: &'static str,
    },

    /// An operation name is not part of the model.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// A payload, label or paginator names a member the structure does not have.
    #[error("structure `{structure}` has no member `{member}`")]
    UnknownMember {
        /// Structure name
        structure: String,
        /// Missing member
        member: String,
    },

    /// A structure contains itself, directly or through lists and maps.
    #[error("shape `{0}` references itself")]
    RecursiveShape(String),

    /// Two enum values canonicalize to the same constant name.
    #[error("enum `{shape}`: values `{first}` and `{second}` both canonicalize to `{constant}`")]
    EnumCollision {
        /// Enum shape name
        shape: String,
        /// The shared constant name
        constant: String,
        /// Value that claimed the constant first
        first: String,
        /// Value that collided with it
        second: String,
    },

    /// A `requestUri` has unbalanced or empty label braces.
    #[error("invalid URI template `{0}`")]
    InvalidUriTemplate(String),

    /// A paginator token is not a top-level scalar member.
    #[error("operation `{operation}` has an unsupported pagination token `{token}`")]
    UnsupportedPaginator {
        /// Operation name
        operation: String,
        /// The offending token expression
        token: String,
    },
}

/// A generated input failed its checks before any request was built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required member is null.
    #[error("missing required field `{field}` of `{structure}`")]
    MissingRequiredField {
        /// Member path, dotted for nested structures
        field: String,
        /// Structure declaring the member
        structure: String,
    },

    /// An enum member holds a value outside its enum.
    #[error("invalid value `{value}` for field `{field}`: not a member of enum `{enum_name}`")]
    InvalidEnumValue {
        /// Member path
        field: String,
        /// The rejected value
        value: String,
        /// Enum shape name
        enum_name: String,
    },

    /// A raw input value cannot be converted to the member's type.
    #[error("`{path}` expected {expected}, found {found}")]
    InvalidType {
        /// Member path
        path: String,
        /// Type of the member
        expected: &'static str,
        /// Type of the input value
        found: &'static str,
    },

    /// A typed input belongs to another shape.
    #[error("input of type `{found}` cannot be used as `{expected}`")]
    WrongInputShape {
        /// Input shape of the operation
        expected: String,
        /// Shape of the value passed in
        found: String,
    },
}

/// A valid input could not be turned into an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// A value does not have the type its member requires.
    #[error("`{path}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Member path
        path: String,
        /// Type of the member
        expected: &'static str,
        /// Type of the value
        found: &'static str,
    },

    /// A URI label member is null.
    #[error("no value for URI label `{0}`")]
    MissingLabel(String),

    /// A header value contains characters that are not allowed in headers.
    #[error("invalid value for header `{0}`")]
    InvalidHeader(String),

    /// A timestamp is outside the range of its wire format.
    #[error("failed to format timestamp")]
    DateTime(#[from] DateTimeFormatError),

    /// The assembled request was rejected by `http`.
    #[error("failed to build request")]
    InvalidRequest(#[from] http::Error),
}

/// A response payload does not match the declared output shape.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// The body is not well-formed JSON or XML.
    #[error("failed to decode response payload")]
    Payload(#[from] PayloadDecodeError),

    /// A wire value cannot be converted to the member's type.
    #[error("`{path}` expected {expected}, found {found}")]
    Coercion {
        /// Member path
        path: String,
        /// Type of the member
        expected: &'static str,
        /// Type found on the wire
        found: &'static str,
    },

    /// A timestamp member holds text no timestamp format accepts.
    #[error("`{path}` is not a valid timestamp")]
    Timestamp {
        /// Member path
        path: String,
        /// Parse failure
        #[source]
        source: DateTimeParseError,
    },

    /// A blob member is not base64.
    #[error("`{path}` is not valid base64")]
    Base64 {
        /// Member path
        path: String,
    },
}

/// Failure to write a generated artifact.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The artifact's location already holds different content from this run.
    #[error("`{module}::{name}` was already emitted with different content")]
    Conflict {
        /// Module of the artifact
        module: String,
        /// Name of the artifact
        name: String,
    },

    /// The artifact could not be written.
    #[error("failed to write artifact")]
    Io(#[from] std::io::Error),
}

/// Compilation of an operation failed.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The model is invalid at this operation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An artifact of this operation could not be emitted.
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// An operation could not be invoked.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The input failed validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The input could not be serialized; nothing was sent.
    #[error(transparent)]
    Serialization(#[from] SerializeError),

    /// The client has no such operation.
    #[error("client has no operation `{0}`")]
    UnknownOperation(String),

    /// Pages were requested from an operation without a paginator.
    #[error("operation `{0}` is not paginated")]
    NotPaginated(String),
}

/// A page of a paginated operation could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The page request could not be built.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The page request failed or its response could not be read.
    #[error(transparent)]
    Sdk(#[from] SdkError<DeserializeError>),
}
