//! Attribute parsing for the Record derive macro.
//!
//! Fields accept `#[sift(skip)]` and `#[sift(rename = "...")]`; the struct
//! itself accepts `#[sift(rename_all = "...")]`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// Naming convention applied to every field without an explicit rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `created_at` -> `CreatedAt`
    Pascal,
    /// `created_at` -> `createdAt`
    Camel,
    /// `created_at` -> `created_at`
    Snake,
}

impl RenameRule {
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        match s {
            "PascalCase" => Ok(RenameRule::Pascal),
            "camelCase" => Ok(RenameRule::Camel),
            "snake_case" => Ok(RenameRule::Snake),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename_all rule: '{}'. Expected one of: PascalCase, camelCase, snake_case",
                    other
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Snake => field.to_string(),
            RenameRule::Pascal | RenameRule::Camel => {
                let mut out = String::with_capacity(field.len());
                let mut upper = self == RenameRule::Pascal;
                for c in field.chars() {
                    if c == '_' {
                        upper = !out.is_empty() || self == RenameRule::Pascal;
                    } else if upper {
                        out.push(c.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}

/// Field-level attributes from `#[sift(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Exclude this field from queries.
    pub skip: bool,
    /// Property name used in queries (default: field name).
    pub rename: Option<String>,
}

/// Struct-level attributes from `#[sift(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    pub rename_all: Option<RenameRule>,
}

fn string_value(expr: &Expr, what: &str) -> Result<LitStr> {
    if let Expr::Lit(ExprLit {
        lit: Lit::Str(s), ..
    }) = expr
    {
        Ok(s.clone())
    } else {
        Err(Error::new(
            expr.span(),
            format!("{what} must be a string literal"),
        ))
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let name = string_value(&nv.value, "rename")?;
                    if name.value().trim().is_empty() {
                        return Err(Error::new(name.span(), "rename must not be empty"));
                    }
                    attr.rename = Some(name.value());
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown sift attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let rule = string_value(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_str(&rule.value(), rule.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown sift attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[sift(...)]` attributes from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("sift") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

/// Extract `#[sift(...)]` attributes from the struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("sift") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}
