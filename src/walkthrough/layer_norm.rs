//! Layer-normalization step: focuses one column of the input embedding,
//! shows the mean/variance aggregation feeding it, then sweeps the
//! normalization across the whole matrix.

use crate::{
    foundation::core::{Dim, Vec3},
    foundation::error::CuelineResult,
    narrative::DimStyle,
    overlay::{draw_data_flow, draw_dependences},
    process::{process_up_to, start_process_before},
    scene::block::{BlockId, BlockKind, LayerNormHandles, Layout},
    scene::camera::{move_camera_to, set_initial_camera},
    scene::split::SceneFrame,
    schedule::scheduler::{Scheduler, TimeWindow},
    walkthrough::{Phase, ProcessStatus, StepArgs, StepReport},
};

const EXAMPLE_IDX: u32 = 3;

pub(crate) fn step(args: StepArgs<'_>) -> StepReport {
    let StepArgs {
        wt,
        layout,
        scene,
        render,
        sched,
        narrative,
    } = args;

    if wt.phase != Phase::LayerNorm {
        return StepReport {
            phase: wt.phase,
            process: ProcessStatus::Idle,
        };
    }

    let c = layout.shape.c;
    let ln = layout.layers[0].ln1;
    let input_block = layout.residual0;

    set_initial_camera(
        render,
        Vec3::new(-6.680, 0.000, -65.256),
        Vec3::new(281.000, 9.000, 2.576),
    );
    wt.dim_highlight_blocks = std::iter::once(input_block).chain(ln.cubes()).collect();

    narrative
        .paragraph(sched.break_index())
        .text("The ")
        .block_ref("input embedding", input_block)
        .text(
            " matrix from the previous section is the input to our first Transformer block. \
             The first step in the Transformer block is to apply layer normalization to this \
             matrix: an operation that normalizes the values in each column of the matrix \
             separately.",
        );
    sched.break_after();

    let t_move_camera = sched.after_time(None, 1.0, 0.0);
    let t_hide_extra = sched.after_time(None, 1.0, 1.0);
    let t_move_input_embed = sched.after_time(None, 1.0, 0.0);
    let t_move_camera_close = sched.after_time(None, 0.5, 0.0);

    sched.break_after();
    narrative
        .paragraph(sched.break_index())
        .text(
            "Normalization helps improve the stability of the model during training. \
             We can regard each column separately, so let's focus on the 4th column (",
        )
        .dim_ref("t = 3", DimStyle::T)
        .text(") for now.");

    sched.break_after();
    let t_focus_column = sched.after_time(None, 0.5, 0.0);

    sched.break_after();
    narrative
        .paragraph(sched.break_index())
        .text(
            "The goal is to make the average value in the column equal to 0 and the standard \
             deviation equal to 1. We find both of these quantities (",
        )
        .block_ref("mean (\u{03bc})", ln.ln_agg1)
        .text(" & ")
        .block_ref("std dev (\u{03c3})", ln.ln_agg2)
        .text(") for the column, then subtract the average and divide by the standard deviation.");

    sched.break_after();
    let t_calc_mu_agg = sched.after_time(None, 0.5, 0.0);
    let t_calc_var_agg = sched.after_time(None, 0.5, 0.0);

    sched.break_after();
    narrative
        .paragraph(sched.break_index())
        .text(
            "E[x] is the average and Var[x] the variance of the column of length ",
        )
        .dim_ref("C", DimStyle::C)
        .text(
            "; the epsilon term (\u{03b5} = 1e-5) prevents division by zero. Once we have the \
             normalized values, we multiply each element by a learned ",
        )
        .block_ref("weight (\u{03b3})", ln.ln_sigma)
        .text(" and add a ")
        .block_ref("bias (\u{03b2})", ln.ln_mu)
        .text(" value, resulting in our ")
        .block_ref("normalized values", ln.ln_resid)
        .text(".");

    sched.break_after();
    let t_clean_aggs = sched.after_time(None, 0.2, 0.0);
    sched.cleanup(t_clean_aggs, &[t_calc_mu_agg, t_calc_var_agg]);
    let t_col_sequence = sched.after_time(None, 2.0, 0.0);

    sched.break_after();
    narrative
        .paragraph(sched.break_index())
        .text("We run this normalization on each column of the ")
        .block_ref("input embedding matrix", input_block)
        .text(", and the result is the ")
        .block_ref("normalized input embedding", ln.ln_resid)
        .text(", ready to be passed into the self-attention layer.");

    sched.break_after();
    let t_cleanup_splits = sched.after_time(None, 0.5, 0.0);
    sched.cleanup(t_cleanup_splits, &[t_focus_column]);
    if sched.active(t_cleanup_splits) {
        // Direct reset path kept from the column-focus retraction;
        // TODO: declare it through cleanup() with t_cleanup_splits as trigger.
        sched.reset(t_col_sequence);
    }
    let t_run_agg_full = sched.after_time(None, 2.0, 0.0);
    let t_run_norm_full = sched.after_time(None, 6.0, 0.0);

    move_camera_to(
        render,
        sched,
        t_move_camera,
        Vec3::new(21.2, 0.0, -102.9),
        Vec3::new(281.5, 11.0, 1.7),
    );

    layout.block_mut(input_block).attrs.highlight = sched.lerp_over(t_hide_extra, 0.0, 0.3);

    let relevant: Vec<BlockId> = std::iter::once(input_block).chain(ln.cubes()).collect();
    let all_blocks: Vec<BlockId> = layout.cubes().to_vec();
    for blk in all_blocks {
        if !relevant.contains(&blk) {
            layout.block_mut(blk).attrs.opacity = sched.lerp_over(t_hide_extra, 1.0, 0.0);
        }
    }
    for &blk in &relevant {
        if blk != input_block && layout.block(blk).kind != BlockKind::Weight {
            layout.block_mut(blk).attrs.access_disabled = true;
        }
    }

    // The input embedding descends onto the normalized-output position.
    let descent = layout.block(ln.ln_resid).pos.y - layout.block(input_block).pos.y;
    layout.block_mut(input_block).attrs.offset.y =
        sched.lerp_over(t_move_input_embed, 0.0, descent);
    layout.block_mut(input_block).attrs.highlight =
        sched.lerp_over(t_move_input_embed, 0.3, 0.0);

    move_camera_to(
        render,
        sched,
        t_move_camera_close,
        Vec3::new(-14.1, 0.0, -187.1),
        Vec3::new(270.0, 4.0, 0.7),
    );

    let split_amt = sched.lerp_over(t_focus_column, 0.0, 2.0);
    let split_pos = f64::from(EXAMPLE_IDX) + 0.5;

    let other_col_opacity = sched.lerp_over(t_focus_column, 1.0, 0.3);
    for id in [ln.ln_agg1, ln.ln_agg2, ln.ln_resid, input_block] {
        layout.block_mut(id).attrs.opacity = other_col_opacity;
    }

    if sched.active(t_focus_column) {
        focus_column(
            layout,
            scene,
            render,
            sched,
            ln,
            input_block,
            split_pos,
            split_amt,
            c,
            Focus {
                t_calc_mu_agg,
                t_calc_var_agg,
                t_col_sequence,
            },
        );
    }

    let mut process = ProcessStatus::Idle;
    if sched.active(t_run_agg_full) {
        process = match fast_forward(layout, scene, sched, ln, t_run_agg_full, t_run_norm_full) {
            Ok(()) => ProcessStatus::Ran,
            Err(e) => ProcessStatus::Degraded(e.to_string()),
        };
    }

    StepReport {
        phase: Phase::LayerNorm,
        process,
    }
}

struct Focus {
    t_calc_mu_agg: TimeWindow,
    t_calc_var_agg: TimeWindow,
    t_col_sequence: TimeWindow,
}

#[allow(clippy::too_many_arguments)]
fn focus_column(
    layout: &mut Layout,
    scene: &mut SceneFrame,
    render: &mut crate::overlay::RenderState,
    sched: &Scheduler,
    ln: LayerNormHandles,
    input_block: BlockId,
    split_pos: f64,
    split_amt: f64,
    c: u32,
    f: Focus,
) {
    let agg_mu_col = scene.split_grid(layout, ln.ln_agg1.into(), Dim::X, split_pos, split_amt);
    let agg_var_col = scene.split_grid(layout, ln.ln_agg2.into(), Dim::X, split_pos, split_amt);
    let resid_col = scene.split_grid(layout, ln.ln_resid.into(), Dim::X, split_pos, split_amt);
    let input_col = scene.split_grid(layout, input_block.into(), Dim::X, split_pos, split_amt);
    let (Some(agg_mu_col), Some(agg_var_col), Some(resid_col), Some(input_col)) =
        (agg_mu_col, agg_var_col, resid_col, input_col)
    else {
        // Example column outside the layout's extent: nothing to focus yet.
        return;
    };

    for col in [agg_mu_col, agg_var_col, resid_col, input_col] {
        scene.attrs_mut(layout, col).opacity = 1.0;
    }

    let agg_dest = Vec3::new(f64::from(EXAMPLE_IDX), 0.0, 0.0);
    if sched.active(f.t_calc_mu_agg) {
        let pin = Vec3::new(0.0, 10.0, 0.0);
        draw_dependences(render, ln.ln_agg1, agg_dest);
        draw_data_flow(render, ln.ln_agg1, agg_dest, pin);
        scene.attrs_mut(layout, agg_mu_col).access_disabled = false;
        scene.attrs_mut(layout, input_col).highlight = 0.3;
    }

    if sched.active(f.t_calc_var_agg) {
        let pin = Vec3::new(9.0, 9.0, 0.0);
        draw_dependences(render, ln.ln_agg2, agg_dest);
        draw_data_flow(render, ln.ln_agg2, agg_dest, pin);
        scene.attrs_mut(layout, agg_var_col).access_disabled = false;
    }

    if sched.active(f.t_col_sequence) {
        scene.attrs_mut(layout, agg_mu_col).access_disabled = false;
        scene.attrs_mut(layout, agg_var_col).access_disabled = false;

        let pin = Vec3::new(-10.0, 0.0, 0.0);
        let c_pos = sched.t(f.t_col_sequence) * f64::from(c);
        let c_idx = (c_pos.floor().clamp(0.0, f64::from(c - 1))) as u32;
        let dest = Vec3::new(f64::from(EXAMPLE_IDX), f64::from(c_idx), 0.0);
        draw_dependences(render, ln.ln_resid, dest);
        draw_data_flow(render, ln.ln_resid, dest, pin);

        if let Some(target_cell) =
            scene.split_grid(layout, resid_col, Dim::Y, f64::from(c_idx) + 0.5, 0.0)
        {
            scene.attrs_mut(layout, target_cell).highlight = 0.3;
        }
        for cell in scene.find_sub_blocks(layout, resid_col, Dim::Y, 0, c_idx) {
            scene.attrs_mut(layout, cell).access_disabled = false;
        }
    }
}

fn fast_forward(
    layout: &mut Layout,
    scene: &mut SceneFrame,
    sched: &Scheduler,
    ln: LayerNormHandles,
    t_run_agg_full: TimeWindow,
    t_run_norm_full: TimeWindow,
) -> CuelineResult<()> {
    let mut info = start_process_before(layout, ln.ln_agg1)?;
    process_up_to(layout, scene, sched, t_run_agg_full, ln.ln_agg2, &mut info)?;
    process_up_to(layout, scene, sched, t_run_norm_full, ln.ln_resid, &mut info)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/walkthrough/layer_norm.rs"]
mod tests;
