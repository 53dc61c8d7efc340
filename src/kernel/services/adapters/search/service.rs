//! 编辑器内搜索服务
//!
//! 扫描在 tokio 的 blocking 线程上进行，结果通过消息回到拥有者线程，
//! 由 `apply_message` 按代号校验后发布。过期的扫描结果直接丢弃。

use super::matcher::{scan_rope, CompiledPattern, ScanAbort};
use super::replace::{replace_all_in_rope, BackrefContext};
use crate::kernel::services::ports::config::SearchSettings;
use crate::kernel::services::ports::host::TextHost;
use crate::kernel::services::ports::search::{
    Result, SearchError, SearchEvent, SearchMessage, SearchOptions, SelectionCause, SharedResults,
};
use crate::models::IntervalStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct SearchTask {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

impl SearchTask {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

struct Query {
    pattern: String,
    options: SearchOptions,
    compiled: CompiledPattern,
}

impl Query {
    fn backrefs(&self) -> Option<BackrefContext> {
        if !self.options.expands_backrefs() {
            return None;
        }
        let grammar = self.options.backref_grammar?;
        let regex = self.compiled.regex()?.clone();
        Some(BackrefContext { regex, grammar })
    }
}

struct PendingReplace {
    ticket: u64,
    base_version: u64,
    on_success: Option<Box<dyn FnOnce()>>,
}

#[cfg(test)]
type ScanDelay = Arc<dyn Fn(&str) -> Duration + Send + Sync>;

pub struct EditorSearcher {
    runtime: tokio::runtime::Handle,
    tx: Sender<SearchMessage>,
    rx: Receiver<SearchMessage>,
    events: Option<Sender<SearchEvent>>,
    query: Option<Query>,
    generation: u64,
    task: Option<SearchTask>,
    results: Option<SharedResults>,
    observed_version: u64,
    cyclic_jumping: bool,
    replace: Option<PendingReplace>,
    next_ticket: u64,
    #[cfg(test)]
    scan_delay: Option<ScanDelay>,
}

impl EditorSearcher {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self::with_settings(runtime, &SearchSettings::default())
    }

    pub fn with_settings(runtime: tokio::runtime::Handle, settings: &SearchSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runtime,
            tx,
            rx,
            events: None,
            query: None,
            generation: 0,
            task: None,
            results: None,
            observed_version: 0,
            cyclic_jumping: settings.cyclic_jumping,
            replace: None,
            next_ticket: 0,
            #[cfg(test)]
            scan_delay: None,
        }
    }

    /// 订阅结果/替换事件
    pub fn set_event_sender(&mut self, events: Sender<SearchEvent>) {
        self.events = Some(events);
    }

    pub fn set_cyclic_jumping(&mut self, cyclic: bool) {
        self.cyclic_jumping = cyclic;
    }

    pub fn is_cyclic_jumping(&self) -> bool {
        self.cyclic_jumping
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pattern(&self) -> Option<&str> {
        self.query.as_ref().map(|q| q.pattern.as_str())
    }

    pub fn options(&self) -> Option<SearchOptions> {
        self.query.as_ref().map(|q| q.options)
    }

    pub fn search(&mut self, host: &dyn TextHost, pattern: &str, options: SearchOptions) -> Result<()> {
        let compiled = CompiledPattern::compile(pattern, &options)?;
        self.query = Some(Query {
            pattern: pattern.to_string(),
            options,
            compiled,
        });
        self.start_scan(host);
        Ok(())
    }

    pub fn stop_search(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.query = None;
        self.results = None;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "search stopped");
        self.publish(SearchEvent::ResultsUpdated {
            generation: self.generation,
            match_count: 0,
        });
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }

    /// 最新一次请求的扫描已经发布
    pub fn is_result_valid(&self) -> bool {
        self.task.is_none()
    }

    pub fn is_replacing(&self) -> bool {
        self.replace.is_some()
    }

    /// 内容变化后按原模式重新搜索
    pub fn notify_content_changed(&mut self, host: &dyn TextHost) {
        if self.query.is_some() {
            self.start_scan(host);
        } else {
            self.observed_version = host.version();
        }
    }

    fn start_scan(&mut self, host: &dyn TextHost) {
        let Some(query) = self.query.as_ref() else {
            return;
        };
        if let Some(task) = self.task.take() {
            tracing::debug!(generation = task.generation(), "cancelling superseded scan");
            task.cancel();
        }

        self.generation += 1;
        self.observed_version = host.version();

        let task = SearchTask::new(self.generation);
        let generation = task.generation();
        let cancelled = task.cancelled_flag();
        let cancelled_for_check = cancelled.clone();
        let compiled = query.compiled.clone();
        let rope = host.snapshot();
        let tx = self.tx.clone();

        #[cfg(test)]
        let delay = self.scan_delay.as_ref().map(|f| f(&query.pattern));
        #[cfg(not(test))]
        let delay: Option<Duration> = None;

        tracing::debug!(
            generation,
            pattern = %query.pattern,
            mode = ?query.options.mode,
            chars = rope.len_chars(),
            "starting scan"
        );

        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                let result = scan_rope(&rope, &compiled, &cancelled);
                if let Some(delay) = delay {
                    std::thread::sleep(delay);
                }
                result
            })
            .await;

            let msg = match result {
                Ok(Ok(results)) => SearchMessage::Finished {
                    generation,
                    results,
                },
                Ok(Err(ScanAbort::Cancelled)) => SearchMessage::Cancelled { generation },
                Ok(Err(ScanAbort::TooLarge)) => SearchMessage::Failed {
                    generation,
                    message: "text too large to index".to_string(),
                },
                Err(e) => {
                    if cancelled_for_check.load(Ordering::Relaxed) {
                        SearchMessage::Cancelled { generation }
                    } else {
                        SearchMessage::Failed {
                            generation,
                            message: format!("Search task failed: {}", e),
                        }
                    }
                }
            };
            let _ = tx.send(msg);
        });

        self.task = Some(task);
    }

    /// 在拥有者线程上处理后台消息，返回处理条数
    pub fn process_messages(&mut self, host: &mut dyn TextHost) -> usize {
        self.sync_with_host(host);
        let mut handled = 0;
        loop {
            match self.rx.try_recv() {
                Ok(msg) => {
                    self.apply_message(host, msg);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    /// 阻塞直到最新扫描发布且没有进行中的替换
    pub fn wait_for_idle(&mut self, host: &mut dyn TextHost, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.sync_with_host(host);
            if self.is_result_valid() && self.replace.is_none() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => self.apply_message(host, msg),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
    }

    fn sync_with_host(&mut self, host: &dyn TextHost) {
        if host.version() != self.observed_version {
            self.notify_content_changed(host);
        }
    }

    /// 唯一的发布入口，只在拥有者线程上调用
    pub(crate) fn apply_message(&mut self, host: &mut dyn TextHost, msg: SearchMessage) {
        match msg {
            SearchMessage::Finished {
                generation,
                results,
            } => {
                if !self.is_current(generation) {
                    tracing::debug!(generation, latest = self.generation, "discarding stale scan");
                    return;
                }
                self.install(results);
            }
            SearchMessage::Failed {
                generation,
                message,
            } => {
                if !self.is_current(generation) {
                    return;
                }
                tracing::warn!(generation, error = %message, "scan failed, publishing no results");
                self.install(IntervalStore::new());
            }
            SearchMessage::Cancelled { generation } => {
                tracing::trace!(generation, "scan cancelled");
                if self.is_current(generation) {
                    self.install(IntervalStore::new());
                }
            }
            SearchMessage::ReplaceFinished {
                ticket,
                text,
                replaced,
            } => {
                let Some(pending) = self.take_replace(ticket) else {
                    return;
                };
                if host.version() != pending.base_version {
                    self.fail_replace("buffer changed while replacing".to_string());
                    self.sync_with_host(host);
                    return;
                }

                let (left, _) = host.selection();
                let (line, col) = host.offset_to_line_col(left);
                host.set_content(text);
                let caret = host.line_col_to_offset(line, col);
                host.set_selection(caret, caret, SelectionCause::Replace);
                tracing::info!(replaced, "replace all applied");

                if let Some(on_success) = pending.on_success {
                    on_success();
                }
                self.publish(SearchEvent::ReplaceCompleted { replaced });
                self.notify_content_changed(host);
            }
            SearchMessage::ReplaceFailed { ticket, message } => {
                if self.take_replace(ticket).is_some() {
                    self.fail_replace(message);
                }
                self.sync_with_host(host);
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.query.is_some() && generation == self.generation
    }

    fn install(&mut self, results: IntervalStore) {
        let match_count = results.len();
        self.results = Some(Arc::new(results));
        self.task = None;
        tracing::debug!(generation = self.generation, match_count, "results published");
        self.publish(SearchEvent::ResultsUpdated {
            generation: self.generation,
            match_count,
        });
    }

    fn publish(&self, event: SearchEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn take_replace(&mut self, ticket: u64) -> Option<PendingReplace> {
        match &self.replace {
            Some(pending) if pending.ticket == ticket => self.replace.take(),
            _ => None,
        }
    }

    fn fail_replace(&self, message: String) {
        tracing::warn!(error = %message, "replace all failed");
        self.publish(SearchEvent::ReplaceFailed { message });
    }

    /// 已发布且最新的结果；扫描进行中返回 None
    fn settled_results(&self) -> Result<Option<&IntervalStore>> {
        if self.query.is_none() {
            return Err(SearchError::NoActiveQuery);
        }
        if !self.is_result_valid() {
            return Ok(None);
        }
        Ok(self.results.as_deref())
    }

    /// 同上，宿主在上次扫描之后被修改过时视为扫描进行中
    fn settled_results_for(&self, host: &dyn TextHost) -> Result<Option<&IntervalStore>> {
        let results = self.settled_results()?;
        if host.version() != self.observed_version {
            return Ok(None);
        }
        Ok(results)
    }

    /// 当前发布的结果快照
    pub fn results(&self) -> Option<SharedResults> {
        if self.is_result_valid() {
            self.results.clone()
        } else {
            None
        }
    }

    pub fn matched_position_count(&self) -> Result<usize> {
        Ok(self.settled_results()?.map(|r| r.len()).unwrap_or(0))
    }

    pub fn current_matched_position_index(&self, host: &dyn TextHost) -> Result<Option<usize>> {
        let Some(results) = self.settled_results_for(host)? else {
            return Ok(None);
        };
        let (left, right) = host.selection();
        if left == right {
            return Ok(None);
        }
        Ok(results.index_of(left, right))
    }

    pub fn is_matched_position_selected(&self, host: &dyn TextHost) -> Result<bool> {
        Ok(self.current_matched_position_index(host)?.is_some())
    }

    pub fn goto_next(&self, host: &mut dyn TextHost) -> Result<bool> {
        let Some(results) = self.settled_results_for(host)? else {
            return Ok(false);
        };
        let (_, right) = host.selection();
        let index = results
            .first_starting_at_or_after(right)
            .or_else(|| (self.cyclic_jumping && !results.is_empty()).then_some(0));
        Ok(Self::select(host, results, index))
    }

    pub fn goto_previous(&self, host: &mut dyn TextHost) -> Result<bool> {
        let Some(results) = self.settled_results_for(host)? else {
            return Ok(false);
        };
        let (left, _) = host.selection();
        let index = results
            .last_ending_at_or_before(left)
            .or_else(|| {
                (self.cyclic_jumping && !results.is_empty()).then(|| results.len() - 1)
            });
        Ok(Self::select(host, results, index))
    }

    fn select(host: &mut dyn TextHost, results: &IntervalStore, index: Option<usize>) -> bool {
        match index.and_then(|i| results.get(i)) {
            Some(interval) => {
                host.set_selection(interval.start, interval.end, SelectionCause::Search);
                true
            }
            None => false,
        }
    }

    /// 替换当前选中的匹配；未选中匹配时跳到下一个。返回是否发生替换
    pub fn replace_current_match(&mut self, host: &mut dyn TextHost, replacement: &str) -> Result<bool> {
        if self.query.is_none() {
            return Err(SearchError::NoActiveQuery);
        }
        if !host.is_editable() {
            return Ok(false);
        }
        self.sync_with_host(host);
        if !self.is_matched_position_selected(host)? {
            self.goto_next(host)?;
            return Ok(false);
        }

        let (left, right) = host.selection();
        let backrefs = self.query.as_ref().and_then(Query::backrefs);
        let text = match backrefs {
            Some(ctx) => {
                let selected = host.snapshot().slice(left..right).to_string();
                ctx.expand_one(&selected, replacement, &mut None)
                    .ok_or_else(|| {
                        SearchError::ReplaceFailure(
                            "selection does not match the pattern".to_string(),
                        )
                    })?
            }
            None => replacement.to_string(),
        };

        host.splice(left, right, &text);
        let caret = left + text.chars().count();
        host.set_selection(caret, caret, SelectionCause::Replace);
        self.notify_content_changed(host);
        Ok(true)
    }

    /// 后台替换全部匹配，完成后在 `process_messages` 中一次性换入
    pub fn replace_all(
        &mut self,
        host: &dyn TextHost,
        replacement: &str,
        on_success: Option<Box<dyn FnOnce()>>,
    ) -> Result<()> {
        let Some(query) = self.query.as_ref() else {
            return Err(SearchError::NoActiveQuery);
        };
        if !host.is_editable() {
            return Ok(());
        }
        if !self.is_result_valid() || host.version() != self.observed_version {
            return Err(SearchError::SearchInProgress);
        }
        if self.replace.is_some() {
            return Err(SearchError::ReplaceInProgress);
        }

        let results = self.results.clone().unwrap_or_default();
        let backrefs = query.backrefs();
        let snapshot = host.snapshot();
        let replacement = replacement.to_string();
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let tx = self.tx.clone();

        tracing::info!(ticket, matches = results.len(), "replace all started");

        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                replace_all_in_rope(&snapshot, &results, &replacement, backrefs.as_ref())
            })
            .await;

            let msg = match result {
                Ok(Ok((text, replaced))) => SearchMessage::ReplaceFinished {
                    ticket,
                    text,
                    replaced,
                },
                Ok(Err(e)) => SearchMessage::ReplaceFailed {
                    ticket,
                    message: e.to_string(),
                },
                Err(e) => SearchMessage::ReplaceFailed {
                    ticket,
                    message: format!("Replace task failed: {}", e),
                },
            };
            let _ = tx.send(msg);
        });

        self.replace = Some(PendingReplace {
            ticket,
            base_version: host.version(),
            on_success,
        });
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_scan_delay(&mut self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) {
        self.scan_delay = Some(Arc::new(delay));
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/service.rs"]
mod tests;
