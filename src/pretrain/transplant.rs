use log::debug;

use crate::{
    arch::{Network, ParamDict, ParamLayer},
    PretrainErr, Result,
};

/// Decides which old output parameter each new output parameter inherits its value from.
///
/// Output parameter names embed the name of the layer feeding the output layer, so they
/// change whenever a hidden layer is added and have to be translated.
pub trait OutputCorrespondence {
    /// Pairs the old output parameter names with the new ones.
    ///
    /// # Arguments
    /// * `old` - The parameter names of the old output layer.
    /// * `new` - The parameter names of the new output layer.
    ///
    /// # Returns
    /// A list of `(old, new)` name pairs or an error if no correspondence exists.
    fn correspond(&self, old: &[&str], new: &[&str]) -> Result<Vec<(String, String)>>;
}

/// Sorts both name lists and pairs them by rank.
///
/// This is a heuristic: it assumes the i-th name on each side plays the same role, which
/// holds for names that only differ in a monotonically growing source layer index. Nothing
/// beyond the amount of names is verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedByName;

impl OutputCorrespondence for SortedByName {
    fn correspond(&self, old: &[&str], new: &[&str]) -> Result<Vec<(String, String)>> {
        if old.len() != new.len() {
            return Err(PretrainErr::OutputParamCountMismatch {
                old: old.len(),
                new: new.len(),
            });
        }

        let mut old = old.to_vec();
        let mut new = new.to_vec();
        old.sort_unstable();
        new.sort_unstable();

        let pairs = old
            .into_iter()
            .zip(new)
            .map(|(o, n)| (o.to_string(), n.to_string()))
            .collect();

        Ok(pairs)
    }
}

/// Copies the trained parameters of `old` into the freshly built `new` network.
///
/// Every hidden layer of `old` is copied by name. The output layer is copied as well when
/// `copy_output_layer` is set, translating its parameter names through `correspondence`.
///
/// The network is taken by value and only handed back once every layer was copied, a
/// partially transplanted network is dropped along with the error.
///
/// # Arguments
/// * `new` - The network of the upcoming epoch.
/// * `old` - The network trained in the previous epoch.
/// * `copy_output_layer` - Whether to carry over the output layer or keep it freshly initialized.
/// * `correspondence` - The output parameter name translation.
///
/// # Returns
/// The transplanted network or an error if the networks are structurally incompatible.
pub fn transplant<N, C>(
    mut new: N,
    old: &N,
    copy_output_layer: bool,
    correspondence: &C,
) -> Result<N>
where
    N: Network,
    C: OutputCorrespondence + ?Sized,
{
    let old_names = old.hidden_layer_names();

    if let Some(missing) = old_names.iter().find(|name| new.hidden(name).is_none()) {
        return Err(PretrainErr::MissingHiddenLayer(missing.to_string()));
    }

    let output_params = if copy_output_layer {
        Some(translate_output(&new, old, correspondence)?)
    } else {
        None
    };

    for name in old_names {
        let Some((old_layer, new_layer)) = old.hidden(name).zip(new.hidden_mut(name)) else {
            return Err(PretrainErr::MissingHiddenLayer(name.to_string()));
        };

        new_layer.set_params(old_layer.params())?;
        debug!(layer = name; "copied hidden layer");
    }

    if let Some(params) = output_params {
        new.output_mut().set_params(params)?;
        debug!("copied output layer");
    }

    Ok(new)
}

/// Builds the new output parameters out of the old output layer's values.
fn translate_output<N, C>(new: &N, old: &N, correspondence: &C) -> Result<ParamDict>
where
    N: Network,
    C: OutputCorrespondence + ?Sized,
{
    let mut old_params = old.output().params();
    let new_params = new.output().params();

    if old_params.len() != new_params.len() {
        return Err(PretrainErr::OutputParamCountMismatch {
            old: old_params.len(),
            new: new_params.len(),
        });
    }

    let old_names: Vec<_> = old_params.keys().map(String::as_str).collect();
    let new_names: Vec<_> = new_params.keys().map(String::as_str).collect();
    let pairs = correspondence.correspond(&old_names, &new_names)?;

    let mut translated = ParamDict::new();
    for (old_name, new_name) in pairs {
        let Some(value) = old_params.remove(&old_name) else {
            return Err(PretrainErr::MissingParam {
                layer: old.output().name().to_string(),
                param: old_name,
            });
        };

        debug!(from = old_name.as_str(), to = new_name.as_str(); "translated output param");
        translated.insert(new_name, value);
    }

    Ok(translated)
}
