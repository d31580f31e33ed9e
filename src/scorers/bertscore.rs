//! BERTScore: greedy cosine matching of contextual token embeddings.
//!
//! Embeddings are the layer-9 hidden states of bert-base-uncased, the layer
//! bert_score picks for that model. F1 is rescaled against bert_score's
//! published baseline for the same model and layer, so unrelated texts land
//! near 0 instead of around 0.85.
//!
//! Needs libtorch, so the model code only exists with the `bertscore`
//! feature. Without it the scorer reports itself unavailable and the other
//! metrics carry on.

use super::{check_pairs, MetricScore, Scorer};
use crate::error::ScoreError;
use log::info;

const METRIC: &str = "BERTScore";

pub const MODEL_NAME: &str = "bert-base-uncased";
/// 1-based encoder layer whose output is compared.
pub const LAYER: usize = 9;
/// bert_score's rescale table for [`MODEL_NAME`]: `LAYER,P,R,F` rows.
pub const BASELINE_URL: &str = "https://raw.githubusercontent.com/Tiiiger/bert_score/master/bert_score/rescale_baseline/en/bert-base-uncased.tsv";

#[derive(Debug)]
pub struct BertScorer {
    /// Run on GPU when one is visible.
    pub cuda: bool,
    /// Rescale F1 with the published baseline.
    pub rescale: bool,
}

impl BertScorer {
    pub fn new(cuda: bool) -> Self {
        Self {
            cuda,
            rescale: true,
        }
    }
}

impl Default for BertScorer {
    fn default() -> Self {
        Self::new(false)
    }
}

/// F baseline for `layer` from a rescale table. Rows are `layer,P,R,F`,
/// comma or tab separated; a header row is skipped.
pub fn parse_baseline(table: &str, layer: usize) -> Result<f64, ScoreError> {
    for line in table.lines() {
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c == '\t')
            .map(str::trim)
            .collect();
        if fields.first().and_then(|f| f.parse::<usize>().ok()) != Some(layer) {
            continue;
        }
        return fields
            .get(3)
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| ScoreError::backend(METRIC, format!("bad baseline row: {line}")));
    }
    Err(ScoreError::backend(
        METRIC,
        format!("no layer {layer} row in rescale baseline"),
    ))
}

/// `(value - baseline) / (1 - baseline)`.
pub fn rescale(value: f64, baseline: f64) -> f64 {
    (value - baseline) / (1.0 - baseline)
}

impl Scorer for BertScorer {
    fn name(&self) -> &'static str {
        METRIC
    }

    fn compute(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> Result<Vec<MetricScore>, ScoreError> {
        check_pairs(predictions, references)?;
        let mut f1 = model::mean_f1(predictions, references, self.cuda)?;
        if self.rescale {
            let baseline = parse_baseline(&model::baseline_table()?, LAYER)?;
            info!("BERTScore baseline F for layer {LAYER}: {baseline}");
            f1 = rescale(f1, baseline);
        }
        Ok(vec![MetricScore::new(METRIC, f1)])
    }
}

#[cfg(not(feature = "bertscore"))]
mod model {
    use super::METRIC;
    use crate::error::ScoreError;

    fn unavailable() -> ScoreError {
        ScoreError::Unavailable {
            metric: METRIC,
            reason: "built without the `bertscore` feature".to_owned(),
        }
    }

    pub(super) fn mean_f1(_: &[String], _: &[String], _: bool) -> Result<f64, ScoreError> {
        Err(unavailable())
    }

    pub(super) fn baseline_table() -> Result<String, ScoreError> {
        Err(unavailable())
    }
}

#[cfg(feature = "bertscore")]
mod model {
    use super::{BASELINE_URL, LAYER, METRIC};
    use crate::error::ScoreError;
    use crate::scorers::f_measure;
    use log::info;
    use rust_bert::bert::{
        BertConfig, BertConfigResources, BertEmbeddings, BertModel, BertModelResources,
        BertVocabResources,
    };
    use rust_bert::resources::{RemoteResource, ResourceProvider};
    use rust_bert::Config;
    use rust_tokenizers::tokenizer::{BertTokenizer, Tokenizer, TruncationStrategy};
    use tch::{nn, no_grad, Device, Kind, Tensor};

    const MAX_LEN: usize = 512;

    struct Encoder {
        tokenizer: BertTokenizer,
        bert: BertModel<BertEmbeddings>,
        num_layers: usize,
        device: Device,
        // keeps the weights alive
        _vs: nn::VarStore,
    }

    fn backend(e: impl ToString) -> ScoreError {
        ScoreError::backend(METRIC, e)
    }

    impl Encoder {
        fn load(cuda: bool) -> Result<Self, ScoreError> {
            let device = if cuda && tch::Cuda::is_available() {
                Device::Cuda(0)
            } else {
                Device::Cpu
            };
            let config_path = RemoteResource::from_pretrained(BertConfigResources::BERT)
                .get_local_path()
                .map_err(backend)?;
            let vocab_path = RemoteResource::from_pretrained(BertVocabResources::BERT)
                .get_local_path()
                .map_err(backend)?;
            let weights_path = RemoteResource::from_pretrained(BertModelResources::BERT)
                .get_local_path()
                .map_err(backend)?;
            info!("BERTScore weights: {}", weights_path.display());

            let tokenizer = BertTokenizer::from_file(&vocab_path, true, true).map_err(backend)?;
            let mut config = BertConfig::from_file(config_path);
            config.output_hidden_states = Some(true);
            let mut vs = nn::VarStore::new(device);
            let bert = BertModel::<BertEmbeddings>::new_with_optional_pooler(
                vs.root() / "bert",
                &config,
                false,
            );
            vs.load(weights_path).map_err(backend)?;

            Ok(Self {
                tokenizer,
                bert,
                num_layers: config.num_hidden_layers as usize,
                device,
                _vs: vs,
            })
        }

        /// Unit-length layer-`LAYER` embeddings for every word piece,
        /// [CLS]/[SEP] dropped.
        fn embed(&self, text: &str) -> Result<Tensor, ScoreError> {
            let enc = self
                .tokenizer
                .encode(text, None, MAX_LEN, &TruncationStrategy::LongestFirst, 0);
            let input_ids = Tensor::from_slice(&enc.token_ids)
                .to(self.device)
                .unsqueeze(0);
            let out = no_grad(|| {
                self.bert
                    .forward_t(Some(&input_ids), None, None, None, None, None, None, false)
            })
            .map_err(backend)?;

            let states = out
                .all_hidden_states
                .ok_or_else(|| backend("model returned no hidden states"))?;
            // the embedding output sits at index 0 only when every layer plus
            // the embeddings is listed
            let idx = if states.len() > self.num_layers {
                LAYER
            } else {
                LAYER - 1
            };
            let hidden = states
                .get(idx)
                .ok_or_else(|| backend(format!("no hidden state for layer {LAYER}")))?
                .squeeze_dim(0);
            let len = hidden.size()[0];
            let pieces = if len > 2 {
                hidden.narrow(0, 1, len - 2)
            } else {
                hidden
            };
            let norm = pieces.norm_scalaropt_dim(2, [-1i64].as_slice(), true);
            Ok(pieces / norm)
        }

        fn f1(&self, prediction: &str, reference: &str) -> Result<f64, ScoreError> {
            let cand = self.embed(prediction)?;
            let refs = self.embed(reference)?;
            let sim = cand.matmul(&refs.transpose(0, 1));
            let precision = sim.max_dim(1, false).0.mean(Kind::Float).double_value(&[]);
            let recall = sim.max_dim(0, false).0.mean(Kind::Float).double_value(&[]);
            Ok(f_measure(precision, recall))
        }
    }

    pub(super) fn baseline_table() -> Result<String, ScoreError> {
        let path = RemoteResource::new(BASELINE_URL, "bert_score-baseline")
            .get_local_path()
            .map_err(backend)?;
        std::fs::read_to_string(&path).map_err(backend)
    }

    pub(super) fn mean_f1(
        predictions: &[String],
        references: &[String],
        cuda: bool,
    ) -> Result<f64, ScoreError> {
        let encoder = Encoder::load(cuda)?;
        let mut total = 0.0;
        for (pred, reference) in predictions.iter().zip(references) {
            total += encoder.f1(pred, reference)?;
        }
        Ok(total / predictions.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "LAYER,P,R,F\n0,0.50,0.51,0.52\n9,0.80,0.81,0.82\n";

    #[test]
    fn baseline_row_is_picked_by_layer() {
        assert_eq!(parse_baseline(TABLE, 9).unwrap(), 0.82);
        assert_eq!(parse_baseline(TABLE, 0).unwrap(), 0.52);
        let tabbed = TABLE.replace(',', "\t");
        assert_eq!(parse_baseline(&tabbed, 9).unwrap(), 0.82);
    }

    #[test]
    fn missing_or_short_baseline_row_is_an_error() {
        assert!(parse_baseline(TABLE, 12).is_err());
        assert!(parse_baseline("9,0.8\n", 9).is_err());
    }

    #[test]
    fn rescale_maps_baseline_to_zero_and_one_to_one() {
        assert_eq!(rescale(0.82, 0.82), 0.0);
        assert!((rescale(1.0, 0.82) - 1.0).abs() < 1e-12);
        assert!(rescale(0.7, 0.82) < 0.0);
    }

    #[test]
    fn rescaling_is_on_by_default() {
        assert!(BertScorer::default().rescale);
        assert!(BertScorer::new(true).cuda);
    }

    #[cfg(not(feature = "bertscore"))]
    #[test]
    fn reports_unavailable_without_feature() {
        let err = BertScorer::default()
            .compute(&["a".to_owned()], &["a".to_owned()])
            .unwrap_err();
        assert!(matches!(err, ScoreError::Unavailable { metric: "BERTScore", .. }));
    }

    #[cfg(not(feature = "bertscore"))]
    #[test]
    fn input_checks_run_first() {
        let err = BertScorer::default().compute(&[], &[]).unwrap_err();
        assert!(matches!(err, ScoreError::Empty));
    }
}
