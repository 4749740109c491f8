//! Shared fixtures for the workspace tests: the first twenty rows of the
//! Kaggle Titanic `train.csv` and an LLM backend that replays scripted
//! replies instead of calling the network.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use titanic_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

/// First 20 passengers of `train.csv`.
///
/// Handy facts: 10 survived, classes 3/1/2 = 13/4/3, 11 women (9 survived),
/// 3 missing ages, mean age 28.0, 15 missing cabins.
pub const SAMPLE_CSV: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
4,1,1,\"Futrelle, Mrs. Jacques Heath (Lily May Peel)\",female,35,1,0,113803,53.1,C123,S
5,0,3,\"Allen, Mr. William Henry\",male,35,0,0,373450,8.05,,S
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
7,0,1,\"McCarthy, Mr. Timothy J\",male,54,0,0,17463,51.8625,E46,S
8,0,3,\"Palsson, Master. Gosta Leonard\",male,2,3,1,349909,21.075,,S
9,1,3,\"Johnson, Mrs. Oscar W (Elisabeth Vilhelmina Berg)\",female,27,0,2,347742,11.1333,,S
10,1,2,\"Nasser, Mrs. Nicholas (Adele Achem)\",female,14,1,0,237736,30.0708,,C
11,1,3,\"Sandstrom, Miss. Marguerite Rut\",female,4,1,1,PP 9549,16.7,G6,S
12,1,1,\"Bonnell, Miss. Elizabeth\",female,58,0,0,113783,26.55,C103,S
13,0,3,\"Saundercock, Mr. William Henry\",male,20,0,0,A/5. 2151,8.05,,S
14,0,3,\"Andersson, Mr. Anders Johan\",male,39,1,5,347082,31.275,,S
15,0,3,\"Vestrom, Miss. Hulda Amanda Adolfina\",female,14,0,0,350406,7.8542,,S
16,1,2,\"Hewlett, Mrs. (Mary D Kingcome) \",female,55,0,0,248706,16,,S
17,0,3,\"Rice, Master. Eugene\",male,2,4,1,382652,29.125,,Q
18,1,2,\"Williams, Mr. Charles Eugene\",male,,0,0,244373,13,,S
19,0,3,\"Vander Planke, Mrs. Julius (Emelia Maria Vandemoortele)\",female,31,1,0,345763,18,,S
20,1,3,\"Masselmani, Mrs. Fatima\",female,,0,0,2649,7.225,,C
";

/// Write [`SAMPLE_CSV`] to `dir/titanic.csv` and return the path.
pub fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("titanic.csv");
    std::fs::write(&path, SAMPLE_CSV).expect("write sample csv");
    path
}

/// LLM backend that answers with queued replies, in order, and records
/// every request it receives. Once the queue is empty every call fails
/// with `LlmError::Unavailable`.
pub struct ScriptedBackend {
    model: String,
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedBackend {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "scripted".to_string(),
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every call fails, e.g. an unreachable provider.
    pub fn failing(message: impl Into<String>) -> Self {
        let backend = Self::new(Vec::<String>::new());
        backend.replies.lock().unwrap().push_back(Err(message.into()));
        backend
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(req);
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                model: self.model.clone(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            Some(Err(message)) => Err(LlmError::Unavailable(message)),
            None => Err(LlmError::Unavailable("script exhausted".to_string())),
        }
    }

    fn model_id(&self) -> &str { &self.model }
}
