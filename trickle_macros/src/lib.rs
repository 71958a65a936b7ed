use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Expr, Ident, LitStr, Result, Token,
};

/// Builds a `trickle::Html` template.
///
/// `{}` takes the next argument, `{name}` captures a clone of a variable in
/// scope and `{{` / `}}` are literal braces. Literal text is written as is;
/// arguments are converted with `Content::from` and escaped when rendered.
/// Values that are not `Clone`, such as nested templates, go in as arguments.
///
/// ```ignore
/// let title = "Tom & Jerry";
/// let page = html!("<h1>{title}</h1><ul>{}</ul>", items);
/// ```
#[proc_macro]
pub fn html(input: TokenStream) -> TokenStream {
    expand(input)
}

/// Same as [`html!`], for stylesheets.
#[proc_macro]
pub fn css(input: TokenStream) -> TokenStream {
    expand(input)
}

/// Same as [`html!`], for scripts.
#[proc_macro]
pub fn js(input: TokenStream) -> TokenStream {
    expand(input)
}

struct TemplateArgs {
    template: LitStr,
    args: Vec<Expr>,
}

impl Parse for TemplateArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let template = input.parse()?;
        let mut args = Vec::new();
        if input.parse::<Option<Token![,]>>()?.is_some() {
            let rest = Punctuated::<Expr, Token![,]>::parse_terminated(input)?;
            args.extend(rest);
        }
        Ok(TemplateArgs { template, args })
    }
}

fn expand(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as TemplateArgs);
    match build(parsed) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn build(parsed: TemplateArgs) -> Result<proc_macro2::TokenStream> {
    let span = parsed.template.span();
    let template = split(&parsed.template.value()).map_err(|msg| syn::Error::new(span, msg))?;

    let mut positional = parsed.args.into_iter();
    let mut slots = Vec::with_capacity(template.slots.len());
    for slot in &template.slots {
        match slot {
            Slot::Next => match positional.next() {
                Some(expr) => slots.push(quote!(#expr)),
                None => return Err(syn::Error::new(span, "more `{}` placeholders than arguments")),
            },
            Slot::Named(name) => {
                let ident = match name.strip_prefix("r#") {
                    Some(raw) => Ident::new_raw(raw, span),
                    None => Ident::new(name, span),
                };
                slots.push(quote!(::std::clone::Clone::clone(&#ident)));
            }
        }
    }
    if let Some(extra) = positional.next() {
        return Err(syn::Error::new_spanned(extra, "argument never used by the template"));
    }

    let segments = template.segments;
    Ok(quote! {
        ::trickle::Html::new(
            ::std::vec![#( ::std::borrow::Cow::Borrowed(#segments) ),*],
            ::std::vec![#( ::trickle::Content::from(#slots) ),*],
        )
    })
}

#[derive(Debug, PartialEq)]
enum Slot {
    Next,
    Named(String),
}

#[derive(Debug, PartialEq)]
struct Split {
    segments: Vec<String>,
    slots: Vec<Slot>,
}

const START: char = '{';
const END: char = '}';

/// Splits a template into literal segments around its placeholders. There is
/// always one more segment than there are slots.
fn split(contents: &str) -> std::result::Result<Split, String> {
    let mut segments = Vec::new();
    let mut slots = Vec::new();
    let mut current = String::new();
    let mut chars = contents.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            START if chars.peek() == Some(&START) => {
                chars.next();
                current.push(START);
            }
            END if chars.peek() == Some(&END) => {
                chars.next();
                current.push(END);
            }
            END => return Err("unmatched `}` in template, use `}}` for a literal brace".into()),
            START => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(END) => break,
                        Some(c) => name.push(c),
                        None => return Err("placeholder opened with `{` is not closed".into()),
                    }
                }
                let name = name.trim();
                if name.is_empty() {
                    slots.push(Slot::Next);
                } else if is_ident(name) {
                    slots.push(Slot::Named(name.to_string()));
                } else {
                    return Err(format!(
                        "unsupported placeholder `{{{name}}}`, expected `{{}}` or `{{identifier}}`"
                    ));
                }
                segments.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    segments.push(current);
    Ok(Split { segments, slots })
}

fn is_ident(name: &str) -> bool {
    syn::parse_str::<Ident>(name).is_ok()
}
