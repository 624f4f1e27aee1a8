// Python drivers for the MOFA+/MEFISTO engine.
//
// Each driver takes a single argument, the path of a JSON request written
// by `PythonBackend`. They need `muon`, `mofax`, `pandas`, `seaborn` and
// `matplotlib` in the interpreter's environment.

/// Shared helpers prepended to the describe and render drivers.
pub const MODEL_PRELUDE: &str = r#"
import json
import sys

import numpy as np
import pandas as pd
import mofax as mofa


def _decode(values):
    return [v.decode() if isinstance(v, bytes) else str(v) for v in values]


def load_model(path):
    """Open a model and expose warped covariates as '<name>_warped' metadata."""
    model = mofa.mofa_model(path)
    handle = model.model
    if "cov_samples_transformed" in handle and "covariates" in handle:
        names = _decode(handle["covariates"]["covariates"][:])
        frames = []
        for group in model.groups:
            values = np.asarray(handle["cov_samples_transformed"][group]).T
            samples = _decode(handle["samples"][group][:])
            frames.append(pd.DataFrame(values, index=samples,
                                       columns=[n + "_warped" for n in names]))
        warped = pd.concat(frames)
        meta = model.metadata.copy()
        for column in warped.columns:
            meta[column] = warped.loc[meta.index, column].values
        model.metadata = meta
    return model


def is_smooth(model):
    return "cov_samples" in model.model


with open(sys.argv[1]) as fh:
    request = json.load(fh)
"#;

/// Fit a model from a staged dataset.
pub const FIT_SCRIPT: &str = r#"
import json
import sys

import anndata as ad
import muon as mu
import pandas as pd

with open(sys.argv[1]) as fh:
    request = json.load(fh)

staged = request["staged"]
config = request["config"]

mods = {}
for view in staged["views"]:
    frame = pd.read_csv(view["path"], index_col=0)
    frame.index = frame.index.astype(str)
    mods[view["name"]] = ad.AnnData(frame)

mdata = mu.MuData(mods)
obs = pd.read_csv(staged["obs"], sep="\t", index_col=staged["obs_key"])
obs.index = obs.index.astype(str)
mdata.obs = mdata.obs.join(obs)

kwargs = {
    "n_factors": config["n_factors"],
    "convergence_mode": config["convergence_mode"],
    "outfile": request["outfile"],
    "verbose": config["verbose"],
}
if config.get("n_iterations") is not None:
    kwargs["n_iterations"] = config["n_iterations"]
if config.get("use_obs") is not None:
    kwargs["use_obs"] = config["use_obs"]
if config.get("groups_label") is not None:
    kwargs["groups_label"] = config["groups_label"]
if config.get("seed") is not None:
    kwargs["seed"] = config["seed"]

smooth = config.get("smooth")
if smooth is not None:
    kwargs["smooth_covariate"] = smooth["covariate"]
    kwargs["smooth_warping"] = smooth["warping"]
    smooth_kwargs = {}
    if smooth.get("warping_ref") is not None:
        smooth_kwargs["warping_ref"] = smooth["warping_ref"]
    if smooth.get("new_values"):
        smooth_kwargs["new_values"] = smooth["new_values"]
    if smooth_kwargs:
        kwargs["smooth_kwargs"] = smooth_kwargs

mu.tl.mofa(mdata, **kwargs)
"#;

/// Describe a fitted model as a JSON snapshot.
pub const DESCRIBE_BODY: &str = r#"
model = load_model(request["model"])
try:
    r2 = model.get_r2()
    snapshot = {
        "summary": repr(model),
        "n_factors": int(model.nfactors),
        "views": [str(v) for v in model.views],
        "groups": [str(g) for g in model.groups],
        "n_samples": int(model.nsamples),
        "metadata_columns": [str(c) for c in model.metadata.columns],
        "r2": [
            {"view": str(row.View), "group": str(row.Group),
             "factor": str(row.Factor), "r2": float(row.R2)}
            for row in r2.itertuples()
        ],
        "smooth": bool(is_smooth(model)),
    }
finally:
    model.close()

with open(request["reply"], "w") as fh:
    json.dump(snapshot, fh, indent=2)
"#;

/// Render the figures of a render job.
pub const RENDER_BODY: &str = r#"
import os

import matplotlib
matplotlib.use("Agg")
import matplotlib.pyplot as plt
import seaborn as sns

job = request["job"]
out_dir = request["output_dir"]
dpi = job["dpi"]

model = load_model(request["model"])


def save(fig, name):
    if hasattr(fig, "savefig"):
        target = fig
    elif hasattr(fig, "figure"):
        target = fig.figure
    else:
        target = plt.gcf()
    target.savefig(os.path.join(out_dir, name), dpi=dpi, bbox_inches="tight")
    plt.close("all")


def as_text(series):
    # Numeric columns compare as floats ("1.0") whether pandas read them as int or float.
    numeric = pd.to_numeric(series, errors="coerce")
    if numeric.notna().sum() == series.notna().sum():
        return numeric.astype(float).astype(str)
    return series.astype(str)


for column, mapping in job["recode"].items():
    values = as_text(model.metadata[column])
    if not values.isin(list(mapping)).any():
        print("recode of " + column + " matched no values; left unchanged")
        continue
    values = values.replace(mapping)
    levels = list(mapping.values()) + ["nan"]
    present = [lvl for lvl in levels if lvl in set(values)]
    model.metadata[column] = pd.Categorical(values, categories=present)

try:
    for plot in job["plots"]:
        kind = plot["kind"]
        if kind == "variance_heatmap":
            kwargs = {"x": "View"}
            if plot.get("vmax") is not None:
                kwargs["vmax"] = plot["vmax"]
            save(mofa.plot_r2(model, **kwargs), plot["file"])
        elif kind == "variance_bar":
            frame = pd.DataFrame(plot["rows"])
            fig = plt.figure(figsize=(8, 6))
            sns.barplot(data=frame, x="View", y="R2", hue="Factors")
            save(fig, plot["file"])
        elif kind == "factors":
            color = plot["color"][0] if len(plot["color"]) == 1 else plot["color"]
            kwargs = {"x": plot["x"], "y": plot["y"], "color": color, "size": plot["size"]}
            if plot.get("palette") is not None:
                kwargs["palette"] = plot["palette"]
            save(mofa.plot_factors(model, **kwargs), plot["file"])
        elif kind == "weights":
            save(mofa.plot_weights(model, views=plot["views"], factors=plot["factor"],
                                   zero_line=True, ncols=plot["ncols"], label_size=10),
                 plot["file"])
        elif kind == "covariates":
            frame = model.fetch_values([plot["x"], plot["y"], plot["color"]])
            fig = plt.figure(figsize=(6, 5))
            sns.scatterplot(data=frame, x=plot["x"], y=plot["y"], hue=plot["color"],
                            s=plot["size"])
            save(fig, plot["file"])
        elif kind == "interpolated":
            save(mofa.plot_interpolated_factors(model, factors=range(model.nfactors),
                                                ncols=plot["ncols"], size=plot["size"]),
                 plot["file"])
        elif kind == "smoothness":
            save(mofa.plot_smoothness(model), plot["file"])
        elif kind == "sharedness":
            save(mofa.plot_sharedness(model), plot["file"])
        else:
            raise ValueError("unknown plot kind: " + kind)
finally:
    model.close()
"#;

/// Full describe driver.
pub fn describe_script() -> String {
    format!("{}{}", MODEL_PRELUDE, DESCRIBE_BODY)
}

/// Full render driver.
pub fn render_script() -> String {
    format!("{}{}", MODEL_PRELUDE, RENDER_BODY)
}
