//! Documentation content for the jsift CLI

use std::fmt::Write as _;

use super::CliError;
use crate::FunctionRegistry;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Conditions,
    Functions,
    Config,
}

impl DocCategory {
    /// Parse category name from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "paths" => Some(Self::Syntax),
            "conditions" | "condition" | "operators" | "ops" => Some(Self::Conditions),
            "functions" | "function" | "fns" => Some(Self::Functions),
            "config" | "configuration" | "fallback" | "aliases" => Some(Self::Config),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"JSIFT DOCUMENTATION

jsift evaluates path queries against JSON documents. A query starts at the
root ($), walks properties, indexes, slices and wildcards, may call
functions, and may end in a comparison that turns the result into true or
false.

DOCUMENTATION CATEGORIES

  syntax            Root, properties, indexes, slices, wildcards, key groups
  conditions        Comparisons, &&, ||, !, grouping and operand paths
  functions         Built-in functions callable as pipeline steps
  config            Aliases, fallback strategies and fuzzy key matching

QUICK REFERENCE

  $                 Root document
  $.user.name       Property access
  $.items[0]        Array index (negative counts from the end)
  $.items[1:3]      Slice
  $.items.*         Every element or member
  $.user{name,age}  Key group
  $.user!{password} Everything except the listed keys
  .length()         Function call
  $.age > 18        Comparison

Run 'jsift doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::parse(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::Conditions) => Ok(CONDITIONS_DOC.to_string()),
        Some(DocCategory::Functions) => Ok(functions_doc(&FunctionRegistry::with_builtins())),
        Some(DocCategory::Config) => Ok(CONFIG_DOC.to_string()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn functions_doc(registry: &FunctionRegistry) -> String {
    let mut doc = String::from(
        "FUNCTIONS\n\n\
         Functions are pipeline steps: they receive every value selected so far.\n\
         A single array selected by a definite path is opened into its elements,\n\
         so $.users.length() counts users.\n\n",
    );
    for builtin in registry.builtins() {
        let args = match (builtin.min_args, builtin.max_args) {
            (0, 0) => String::new(),
            (1, 1) => "arg".to_string(),
            (min, max) => format!("{min}..{max} args"),
        };
        let signature = format!("{}({})", builtin.name, args);
        let _ = writeln!(doc, "  {:<18}{}", signature, builtin.summary);
    }
    doc.push_str(
        "\nEXAMPLES\n\n\
         \x20 $.users.map(.name)\n\
         \x20 $.users.filter(.age >= 18 && .active == true)\n\
         \x20 $.tags.unique().sort()\n\
         \x20 $.prices.sum()\n\
         \x20 $.emails.matches(\"@example\\.com$\")\n",
    );
    doc
}

const SYNTAX_DOC: &str = r#"SYNTAX

ROOT
  $                     The evaluation base. Optional at the start of a query:
                        'user.name' and '$.user.name' are the same query.

PROPERTIES
  .name                 Member of an object
  ["first name"]        Member whose name needs quoting
  ."first name"         Same, dotted spelling

ARRAYS
  [0]                   First element
  [-1]                  Last element
  [1:3]                 Elements 1 and 2
  [::-1]                Every element, reversed
  [::2]                 Every other element

WILDCARDS
  .*                    Every member value of an object, or every element
  [*]                   Same

KEY GROUPS
  {a, b}                Members a and b, in that order
  ["a", "b"]            Same
  !{password}           The object without the listed members

RESULT SHAPE
  A path that selects one value per step returns that value. Wildcards,
  slices and key groups fan out and return a list.
"#;

const CONDITIONS_DOC: &str = r#"CONDITIONS

COMPARISONS
  ==  !=                Equality; values of different types are never equal
  <  <=  >  >=          Ordering; both sides must be numbers or both strings

CONNECTIVES
  &&  and               Both sides true (binds tighter than ||)
  ||  or                Either side true
  !                     Negation
  ( ... )               Grouping

OPERANDS
  42  "text"  true  null      Literals
  $.path                      Absolute path from the evaluation base
  @  @.field  .field  field   Relative to the values flowing into the condition

After path steps, relative operands read the selected value, not the
document. In  $.a > 1 && .b < 2  the .b is looked up inside $.a;
write $.b to read from the document.

A comparison right after path steps compares the selected value:

  $.age > 18
  $.user.role == "admin" || $.user.role == "owner"

Inside filter() the condition is evaluated once per element:

  $.users.filter(.age >= 18 && !(.banned == true))
"#;

const CONFIG_DOC: &str = r#"CONFIGURATION

Passed as JSON with --config FILE. Every section is optional.

  {
    "aliases": [ { "alias": "u", "path": "$.user.name" } ],
    "fallback": {
      "strategy": "infer",
      "inferRules": {
        "alternateKeys": ["fullName"],
        "alternateQueries": ["$.profile.name"],
        "exhausted": { "strategy": "default", "value": "N/A" }
      }
    },
    "fuzzy": { "enabled": true, "distance": 1, "limit": 1, "ignoreCase": false }
  }

ALIASES
  A property step named like an alias is replaced by the alias path. Alias
  paths are absolute: '$.x.u' evaluates '$.user.name'.

FALLBACK STRATEGIES (when a step does not resolve)
  error                 Fail with a path-not-found error (default)
  default               Substitute "value"
  skip                  Drop the element and carry on
  infer                 Try alternateKeys on the same object, then
                        alternateQueries from the base, then "exhausted"

FUZZY MATCHING
  When a key is missing, keys within "distance" edits (insert, delete,
  substitute, swap two adjacent characters) are candidates. The closest
  "limit" candidates survive; exactly one survivor is used, otherwise the
  lookup falls back. "limit": 0 keeps no candidate.
"#;
