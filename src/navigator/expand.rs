//! URI template expansion.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::{Blueprint, Navigator};
use crate::core::{NavigatorError, Result};
use crate::template;

impl Navigator {
    /// Bind template variables and return a concrete navigator.
    ///
    /// Arguments bound by an earlier [`expand_partial`](Self::expand_partial)
    /// are merged in and keep their earlier values. Unbound variables expand
    /// to nothing, so `expand(Map::new())` nulls every variable out. Numbers
    /// are written in their JSON form: `0` becomes `"0"`.
    ///
    /// The result is a new navigator: the template is left untouched and the
    /// result is never registered, so expanding twice yields two instances.
    ///
    /// # Errors
    ///
    /// [`NavigatorError::NotTemplated`] if this navigator has no template.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use hal_navigator::Navigator;
    /// # use serde_json::{Map, json};
    /// # async fn example(api: Navigator) -> hal_navigator::Result<()> {
    /// let search = api.rel("search").await?;
    /// let mut args = Map::new();
    /// args.insert("q".to_string(), json!("rust"));
    /// let results = search.expand(args)?;
    /// results.get().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn expand(&self, args: Map<String, Value>) -> Result<Self> {
        self.expand_with(args, false)
    }

    /// Bind some template variables and stay templated.
    ///
    /// The returned navigator keeps the template and the accumulated arguments
    /// for a later [`expand`](Self::expand).
    pub fn expand_partial(&self, args: Map<String, Value>) -> Result<Self> {
        self.expand_with(args, true)
    }

    pub(crate) fn expand_with(&self, args: Map<String, Value>, keep_templated: bool) -> Result<Self> {
        let Some(template_uri) = self.template_uri().filter(|_| self.is_templated()) else {
            return Err(NavigatorError::NotTemplated {
                uri: self.uri().unwrap_or_default().to_string(),
            });
        };

        let mut merged = args;
        for (name, value) in self.template_args() {
            merged.insert(name.clone(), value.clone());
        }

        let base = self.blueprint();
        let blueprint = if keep_templated {
            Blueprint {
                uri: None,
                template_args: merged,
                ..base
            }
        } else {
            Blueprint {
                uri: Some(template::expand(template_uri, &merged)?),
                template_uri: None,
                template_variables: BTreeSet::new(),
                template_args: Map::new(),
                templated: false,
                parent: None,
                ..base
            }
        };
        Ok(self.detached(blueprint))
    }
}
