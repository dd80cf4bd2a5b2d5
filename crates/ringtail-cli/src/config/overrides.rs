use crate::cli::{CommonArgs, ReadArgs, WriteArgs};
use ringtail::engine::options::RawOptions;

// Boolean flags can only switch an option on; an absent flag leaves lower layers alone.
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

fn list<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

impl From<&CommonArgs> for RawOptions {
    fn from(args: &CommonArgs) -> Self {
        RawOptions {
            mode: args.mode.clone(),
            input_db: args.input_db.clone(),
            bookmark_name: args.bookmark_name.clone(),
            overwrite: flag(args.overwrite),
            ..RawOptions::default()
        }
    }
}

impl From<&WriteArgs> for RawOptions {
    fn from(args: &WriteArgs) -> Self {
        RawOptions {
            file: list(&args.file),
            file_path: list(&args.file_path),
            file_list: list(&args.file_list),
            pattern: args.pattern.clone(),
            recursive: flag(args.recursive),
            output_db: args.output_db.clone(),
            add_results: flag(args.add_results),
            duplicate_handling: args.duplicate_handling.clone(),
            save_receptor: flag(args.save_receptor),
            receptor_file: args.receptor_file.clone(),
            add_interactions: flag(args.add_interactions),
            interaction_cutoffs: args.interaction_cutoffs.clone(),
            interaction_tolerance: args.interaction_tolerance,
            max_poses: args.max_poses,
            store_all_poses: flag(args.store_all_poses),
            ..RawOptions::from(&args.common)
        }
    }
}

impl From<&ReadArgs> for RawOptions {
    fn from(args: &ReadArgs) -> Self {
        RawOptions {
            log: args.log.clone(),
            out_fields: args.out_fields.clone(),
            order_results: args.order_results.clone(),
            all_poses: flag(args.all_poses),
            export_bookmark_csv: args.export_bookmark_csv.clone(),
            export_query_csv: args.export_query_csv.clone(),
            export_sdf_path: args.export_sdf_path.clone(),
            export_bookmark_db: flag(args.export_bookmark_db),
            new_data_from_bookmark: flag(args.new_data_from_bookmark),
            filter_bookmark: args.filter_bookmark.clone(),
            plot: flag(args.plot),

            eworst: args.eworst,
            ebest: args.ebest,
            leworst: args.leworst,
            lebest: args.lebest,
            energy_percentile: args.energy_percentile,
            le_percentile: args.le_percentile,

            name: list(&args.name),
            substructure: list(&args.substructure),
            substructure_join: args.substructure_join.clone(),

            van_der_waals: list(&args.van_der_waals),
            hydrogen_bond: list(&args.hydrogen_bond),
            reactive_res: list(&args.reactive_res),
            hb_count: args.hb_count,
            react_any: flag(args.react_any),
            max_miss: args.max_miss,
            ..RawOptions::from(&args.common)
        }
    }
}
