//! Grammar for the compact pieces of GraphQL syntax that appear in field configuration: names,
//! type references (`[String!]!`), argument-definition lists (`limit: Int = 10, sort: Sort`) and
//! the constant values allowed as argument defaults.
//!
//! Ignored tokens follow the GraphQL lexical rules: whitespace, commas and `#` comments may appear
//! between any two tokens.

use std::fmt::{Display, Formatter};

use apollo_compiler::ast::{FloatValue, IntValue, Type, Value};
use apollo_compiler::Name;
use apollo_compiler::Node;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace1, one_of, satisfy};
use nom::combinator::{all_consuming, cut, map, map_res, not, opt, recognize};
use nom::error::ErrorKind;
use nom::multi::{many0, many0_count, many1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset into the parsed source where parsing stopped.
    pub offset: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at column {}", self.message, self.offset + 1)
    }
}

impl std::error::Error for ParseError {}

/// One entry of an argument-definition list.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
}

/// Parses `name` or `name(arg: Type, ...)` and returns the name with its inline arguments.
pub fn parse_field_definition(source: &str) -> Result<(Name, Vec<ArgumentDefinition>), ParseError> {
    let parsed = all_consuming(tuple((
        ignored,
        graphql_name,
        ignored,
        opt(arguments_definition),
        ignored,
    )))(source);
    match parsed {
        Ok((_, (_, name, _, arguments, _))) => Ok((name, arguments.unwrap_or_default())),
        Err(err) => Err(syntax_error(source, err)),
    }
}

/// Parses the body of an argument-definition list, without the surrounding parentheses.
pub fn parse_argument_definitions(source: &str) -> Result<Vec<ArgumentDefinition>, ParseError> {
    all_consuming(delimited(
        ignored,
        many1(terminated(argument_definition, ignored)),
        ignored,
    ))(source)
    .map(|(_, arguments)| arguments)
    .map_err(|err| syntax_error(source, err))
}

pub fn parse_type(source: &str) -> Result<Type, ParseError> {
    all_consuming(delimited(ignored, type_reference, ignored))(source)
        .map(|(_, ty)| ty)
        .map_err(|err| syntax_error(source, err))
}

pub fn parse_const_value(source: &str) -> Result<Value, ParseError> {
    all_consuming(delimited(ignored, const_value, ignored))(source)
        .map(|(_, value)| value)
        .map_err(|err| syntax_error(source, err))
}

/// True if the whole string is a single GraphQL name.
pub fn is_valid_name(source: &str) -> bool {
    all_consuming(name)(source).is_ok()
}

fn syntax_error(source: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let remaining = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => "",
    };
    let offset = source.len() - remaining.len();
    let message = match remaining.chars().next() {
        Some(c) => format!("unexpected \"{c}\""),
        None => "unexpected end of input".to_owned(),
    };
    ParseError { offset, message }
}

fn ignored(input: &str) -> IResult<&str, ()> {
    map(many0_count(alt((multispace1, tag(","), comment))), |_| ())(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('#'), take_while(|c| c != '\n' && c != '\r')))(input)
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_name_start),
        take_while(|c: char| c == '_' || c.is_ascii_alphanumeric()),
    ))(input)
}

fn graphql_name(input: &str) -> IResult<&str, Name> {
    map_res(name, Name::new)(input)
}

fn type_reference(input: &str) -> IResult<&str, Type> {
    let (input, ty) = alt((list_type, map(graphql_name, Type::Named)))(input)?;
    let (input, non_null) = opt(preceded(ignored, char('!')))(input)?;
    Ok((input, if non_null.is_some() { ty.non_null() } else { ty }))
}

// Once an opening bracket has been seen, the bracketed production is committed to (`cut`), so
// errors point at the offending token instead of at the bracket.
fn list_type(input: &str) -> IResult<&str, Type> {
    map(
        preceded(
            pair(char('['), ignored),
            cut(terminated(type_reference, pair(ignored, char(']')))),
        ),
        Type::list,
    )(input)
}

fn arguments_definition(input: &str) -> IResult<&str, Vec<ArgumentDefinition>> {
    preceded(
        pair(char('('), ignored),
        cut(terminated(
            many1(terminated(argument_definition, ignored)),
            char(')'),
        )),
    )(input)
}

fn argument_definition(input: &str) -> IResult<&str, ArgumentDefinition> {
    let (input, name) = graphql_name(input)?;
    let (input, _) = tuple((ignored, char(':'), ignored))(input)?;
    let (input, ty) = type_reference(input)?;
    let (input, default_value) =
        opt(preceded(tuple((ignored, char('='), ignored)), cut(const_value)))(input)?;
    Ok((
        input,
        ArgumentDefinition {
            name,
            ty,
            default_value,
        },
    ))
}

fn const_value(input: &str) -> IResult<&str, Value> {
    alt((
        number_value,
        map(string_value, Value::String),
        list_value,
        object_value,
        keyword_or_enum_value,
    ))(input)
}

fn keyword_or_enum_value(input: &str) -> IResult<&str, Value> {
    let (rest, name) = graphql_name(input)?;
    let value = match name.as_str() {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        _ => Value::Enum(name),
    };
    Ok((rest, value))
}

fn number_value(input: &str) -> IResult<&str, Value> {
    let (rest, text) = terminated(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        not(satisfy(|c| c == '.' || is_name_start(c))),
    )(input)?;
    let value = if text.contains(['.', 'e', 'E']) {
        Value::Float(FloatValue::new_parsed(text))
    } else {
        Value::Int(IntValue::new_parsed(text))
    };
    Ok((rest, value))
}

fn string_value(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some('"') => return Ok((chars.as_str(), out)),
            Some('\\') => {
                let escaped = match chars.next() {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('/') => '/',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('u') => {
                        let hex = chars.as_str();
                        let code_point = hex
                            .get(..4)
                            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
                            .and_then(char::from_u32);
                        let Some(c) = code_point else {
                            return Err(string_failure(rest));
                        };
                        rest = &hex[4..];
                        out.push(c);
                        continue;
                    }
                    _ => return Err(string_failure(rest)),
                };
                out.push(escaped);
                rest = chars.as_str();
            }
            Some('\n') | Some('\r') | None => return Err(string_failure(rest)),
            Some(c) => {
                out.push(c);
                rest = chars.as_str();
            }
        }
    }
}

fn string_failure(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, ErrorKind::Char))
}

fn list_value(input: &str) -> IResult<&str, Value> {
    map(
        preceded(
            pair(char('['), ignored),
            cut(terminated(many0(terminated(const_value, ignored)), char(']'))),
        ),
        |items| Value::List(items.into_iter().map(Node::new).collect()),
    )(input)
}

fn object_value(input: &str) -> IResult<&str, Value> {
    map(
        preceded(
            pair(char('{'), ignored),
            cut(terminated(many0(terminated(object_field, ignored)), char('}'))),
        ),
        Value::Object,
    )(input)
}

fn object_field(input: &str) -> IResult<&str, (Name, Node<Value>)> {
    let (input, name) = graphql_name(input)?;
    let (input, _) = tuple((ignored, char(':'), ignored))(input)?;
    let (input, value) = const_value(input)?;
    Ok((input, (name, Node::new(value))))
}
